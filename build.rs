fn main() {
    // ESP-IDF link arguments and sysenv are only needed for the firmware
    // build; host tests and the simulator compile without them.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
