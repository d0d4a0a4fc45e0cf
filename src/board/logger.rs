//! Log backend selection. With `log-rtt` the log facade prints over RTT;
//! without it logging compiles away.

cfg_if::cfg_if! {
    if #[cfg(feature = "log-rtt")] {
        use log::{LevelFilter, Metadata, Record};
        use rtt_target::{rprintln, rtt_init_print};

        struct RttLogger;

        static LOGGER: RttLogger = RttLogger;

        impl log::Log for RttLogger {
            fn enabled(&self, _metadata: &Metadata) -> bool {
                true
            }

            fn log(&self, record: &Record) {
                rprintln!("{} - {}", record.level(), record.args());
            }

            fn flush(&self) {}
        }

        /// Call once, before anything logs.
        pub fn init() {
            rtt_init_print!();
            let _ = log::set_logger(&LOGGER).map(|()| log::set_max_level(LevelFilter::Info));
        }
    } else {
        /// Logging disabled; records go nowhere.
        pub fn init() {}
    }
}
