//! Display notifier: reports the selected waveform name to an external
//! display collaborator.

/// The display device failed to accept the update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayError {
    Unresponsive,
}

/// One-way name reporting. May block briefly on the device's own I/O;
/// failure is non-fatal to the caller and is not retried.
pub trait Notifier {
    fn show(&mut self, name: &'static str) -> Result<(), DisplayError>;
}

/// Notifier that reports through the log facade, for boards without a
/// display attached.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show(&mut self, name: &'static str) -> Result<(), DisplayError> {
        log::info!("waveform: {}", name);
        Ok(())
    }
}
