//! High level Tympan interface

mod implementation;

mod types;
pub use types::{CalibrationRow, CalibrationTable};

use std::{io::Write, path::Path, time::Duration};

use crate::{config::SweepSpeed, Result, TympanDevice};

/// Stop any test tone
pub const MUTE: &str = "m";
/// Return the test controller to its defaults and clear old measurements
pub const RESET_TEST: &str = "q";
/// Print the help menu
pub const HELP: &str = "h";
/// Start the stepped-frequency sweep
pub const START_SWEEP: &str = "T";
/// Print every stored measurement
pub const PRINT_RESULTS: &str = "v";
/// Print the names of the files at the root of the SD card
pub const LIST_FILES: &str = "z";
/// Begin sending a file from the SD card
pub const SEND_FILE: &str = "x";

/// Delimiter between names in the SD card listing
pub const LISTING_DELIMITER: char = ',';

/// Trait for running the stepped-tone calibration
///
/// Automatically implemented for implementors of [TympanDevice](crate::TympanDevice).
pub trait Calibration: private::Sealed {
    /// Silence the current test without printing the reply
    fn mute(&mut self) -> Result<String>;

    /// Reset the test parameters and clear earlier measurements
    fn reset_test(&mut self) -> Result<String>;

    /// Get the help menu, which is also a good check that the link works
    fn help(&mut self) -> Result<String>;

    /// Select the sweep speed and return the quiet period that goes with it
    fn set_sweep_speed(&mut self, speed: SweepSpeed) -> Result<Duration>;

    /// Start the sweep and follow its output until the device has been quiet for `quiet_period`
    fn start_sweep(&mut self, quiet_period: Duration) -> Result<String>;

    /// Ask for all measurements and decode them
    fn get_results(&mut self) -> Result<CalibrationTable>;

    /// Mute, reset, show the help menu, set the speed, sweep and fetch the results
    fn run_calibration(&mut self, speed: SweepSpeed) -> Result<CalibrationTable>;
}

/// Trait for reading files from the Tympan's SD card
///
/// Automatically implemented for implementors of [TympanDevice](crate::TympanDevice).
pub trait SdTransfer: private::Sealed {
    /// Names of the files at the root of the SD card
    fn list_files(&mut self) -> Result<Vec<String>>;

    /// Copy `name` from the SD card into `sink`, returning its size in bytes
    fn receive_file(&mut self, name: &str, sink: &mut dyn Write) -> Result<u64>;

    /// Copy `name` from the SD card into a new local file at `local_path`
    ///
    /// The local file is removed again if the transfer fails.
    fn download_file(&mut self, name: &str, local_path: &Path) -> Result<u64>;
}

impl<T: TympanDevice> Calibration for T {
    fn mute(&mut self) -> Result<String> {
        implementation::mute(self)
    }

    fn reset_test(&mut self) -> Result<String> {
        implementation::simple_command(self, RESET_TEST)
    }

    fn help(&mut self) -> Result<String> {
        implementation::simple_command(self, HELP)
    }

    fn set_sweep_speed(&mut self, speed: SweepSpeed) -> Result<Duration> {
        implementation::set_sweep_speed(self, speed)
    }

    fn start_sweep(&mut self, quiet_period: Duration) -> Result<String> {
        implementation::start_sweep(self, quiet_period)
    }

    fn get_results(&mut self) -> Result<CalibrationTable> {
        implementation::get_results(self)
    }

    fn run_calibration(&mut self, speed: SweepSpeed) -> Result<CalibrationTable> {
        self.mute()?;
        self.reset_test()?;
        self.help()?;
        let quiet_period = self.set_sweep_speed(speed)?;
        self.start_sweep(quiet_period)?;
        self.get_results()
    }
}

impl<T: TympanDevice> SdTransfer for T {
    fn list_files(&mut self) -> Result<Vec<String>> {
        implementation::list_files(self)
    }

    fn receive_file(&mut self, name: &str, sink: &mut dyn Write) -> Result<u64> {
        implementation::receive_file(self, name, sink)
    }

    fn download_file(&mut self, name: &str, local_path: &Path) -> Result<u64> {
        implementation::download_file(self, name, local_path)
    }
}

mod private {
    pub trait Sealed {}
    impl<T: crate::TympanDevice> Sealed for T {}
}
