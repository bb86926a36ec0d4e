fn main() {
    // The ESP-IDF sysenv only exists when cross-compiling for the device.
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }
}
