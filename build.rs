fn main() {
    // Host builds (tests, simulation binary) need no ESP-IDF environment.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
