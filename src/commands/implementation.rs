use log::{debug, info, warn};
use std::{fs::File, io::Write, path::Path, time::Duration};

use crate::{
    config::{ReplyTiming, SweepSpeed},
    parse::{parse_calibration, parse_file_size, parse_listing},
    Result, TympanDevice,
};

use super::{
    CalibrationTable, LISTING_DELIMITER, LIST_FILES, MUTE, PRINT_RESULTS, SEND_FILE, START_SWEEP,
};

pub(super) fn simple_command<T: TympanDevice>(device: &mut T, command: &str) -> Result<String> {
    device.command(command, ReplyTiming::default())
}

pub(super) fn mute<T: TympanDevice>(device: &mut T) -> Result<String> {
    device.command(MUTE, ReplyTiming::default().silent())
}

pub(super) fn set_sweep_speed<T: TympanDevice>(
    device: &mut T,
    speed: SweepSpeed,
) -> Result<Duration> {
    if let Some(command) = speed.tuning_command() {
        info!("Setting sweep speed {:?}", speed);
        device.command(command, ReplyTiming::default())?;
    }
    Ok(speed.quiet_period())
}

pub(super) fn start_sweep<T: TympanDevice>(
    device: &mut T,
    quiet_period: Duration,
) -> Result<String> {
    info!("Starting sweep, waiting for {:?} of silence", quiet_period);
    device.command(START_SWEEP, ReplyTiming::with_quiet_period(quiet_period))
}

pub(super) fn get_results<T: TympanDevice>(device: &mut T) -> Result<CalibrationTable> {
    let reply = device.command(PRINT_RESULTS, ReplyTiming::default())?;
    let table = parse_calibration(&reply)?;
    debug!("get_results: {:?}", table);
    Ok(table)
}

pub(super) fn list_files<T: TympanDevice>(device: &mut T) -> Result<Vec<String>> {
    let line = device.command_line(LIST_FILES)?;
    parse_listing(&line, LISTING_DELIMITER)
}

pub(super) fn receive_file<T: TympanDevice>(
    device: &mut T,
    name: &str,
    sink: &mut dyn Write,
) -> Result<u64> {
    // the device prompts for a file name first
    let prompt = device.command(SEND_FILE, ReplyTiming::default().silent())?;
    debug!("receive_file: prompt {:?}", prompt.trim());

    device.send(name)?;
    let size_line = device.read_line()?;
    if size_line.trim().is_empty() {
        return Err(
            crate::device::Error::Timeout(format!("no file size announced for {}", name)).into(),
        );
    }
    let size = parse_file_size(&size_line)?;

    info!("Receiving {} ({} bytes)", name, size);
    device.receive_bytes(size, sink)
}

pub(super) fn download_file<T: TympanDevice>(
    device: &mut T,
    name: &str,
    local_path: &Path,
) -> Result<u64> {
    let mut file = File::create(local_path)?;
    match receive_file(device, name, &mut file) {
        Ok(len) => {
            info!("Saved {} as {}", name, local_path.display());
            Ok(len)
        }
        Err(e) => {
            drop(file);
            if let Err(rm) = std::fs::remove_file(local_path) {
                warn!(
                    "Could not remove partial file {}: {}",
                    local_path.display(),
                    rm
                );
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use crate::{
        commands::{Calibration, SdTransfer},
        device::{mock::MockComm, LineDevice},
        Error, Tympan,
    };

    use super::*;

    fn tympan(comm: MockComm) -> Tympan<LineDevice<MockComm>> {
        Tympan::new(LineDevice::new(comm), Duration::from_millis(100)).with_echo(io::sink())
    }

    const RESULTS: &[u8] = b"Measurement: printing all measurements: 2\r\n\
        Measurement: (step, Tone Hz, Left dBFS, Right dBFS): 0, 125.00, -40.25, -41.00\r\n\
        Measurement: (step, Tone Hz, Left dBFS, Right dBFS): 1, 250.00, -38.50, -39.75\r\n";

    #[test]
    fn results_are_parsed() {
        let comm = MockComm::new().on_write(PRINT_RESULTS, &[(0, RESULTS)]);
        let mut device = tympan(comm);

        let table = device.get_results().unwrap();
        assert_eq!(table.test_ids(), vec![0, 1]);
        assert_eq!(table.freqs_hz(), vec![125.0, 250.0]);
        assert_eq!(table.channel(0), Some(vec![-40.25, -38.5]));
    }

    #[test]
    fn results_without_measurements() {
        let comm = MockComm::new().on_write(
            PRINT_RESULTS,
            &[(0, b"Measurement: printing all measurements: 0\r\n".as_slice())],
        );
        let mut device = tympan(comm);

        assert!(matches!(device.get_results(), Err(Error::EmptyResult(_))));
    }

    #[test]
    fn standard_speed_sends_nothing() {
        let comm = MockComm::new();
        let written = comm.written();
        let mut device = tympan(comm);

        assert_eq!(
            device.set_sweep_speed(SweepSpeed::Standard).unwrap(),
            Duration::from_millis(1100)
        );
        assert!(written.borrow().is_empty());
    }

    #[test]
    fn full_calibration_sequence() {
        let comm = MockComm::new()
            .on_write(MUTE, &[])
            .on_write(
                "q",
                &[(0, b"SerialManager: reseting test controller to its defaults...\r\n".as_slice())],
            )
            .on_write("h", &[(0, b"SerialManager Help: Available Commands:\r\n".as_slice())])
            .on_write(
                "DDD",
                &[(0, b"SerialManager: decreased step duration to 0.40 sec\r\n".as_slice())],
            )
            .on_write(
                START_SWEEP,
                &[
                    (0, b"SerialManager: clearing any previous input measurements.\r\n".as_slice()),
                    (150, b"TestController: step 1\r\n".as_slice()),
                ],
            )
            .on_write(PRINT_RESULTS, &[(0, RESULTS)]);
        let written = comm.written();
        let mut device = tympan(comm);

        let table = device.run_calibration(SweepSpeed::Fast).unwrap();
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.channel_count(), 2);
        assert_eq!(written.borrow().as_slice(), b"m\nq\nh\nDDD\nT\nv\n");
    }

    #[test]
    fn listing() {
        let comm = MockComm::new().on_write(
            LIST_FILES,
            &[(
                0,
                b"SerialMonitor: Listing Files on SD: AUDIO001.WAV,AUDIO002.TXT,AUDIO003.wav\r\n"
                    .as_slice(),
            )],
        );
        let mut device = tympan(comm);

        assert_eq!(
            device.list_files().unwrap(),
            ["AUDIO001.WAV", "AUDIO002.TXT", "AUDIO003.wav"]
        );
    }

    fn transfer_script(data: &'static [u8]) -> MockComm {
        MockComm::new()
            .on_write(
                SEND_FILE,
                &[(
                    0,
                    b"SdFileTransfer: Send filename (ending with newline character) within 10 seconds\r\n"
                        .as_slice(),
                )],
            )
            .on_write(
                "AUDIO001.WAV",
                &[(0, b"SdFileTransfer: file size (bytes) = 12\r\n".as_slice()), (10, data)],
            )
    }

    #[test]
    fn receive_file_into_sink() {
        let comm = transfer_script(b"RIFF\x04\0\0\0WAVE");
        let written = comm.written();
        let mut device = tympan(comm);
        let mut sink = Vec::new();

        assert_eq!(device.receive_file("AUDIO001.WAV", &mut sink).unwrap(), 12);
        assert_eq!(sink, b"RIFF\x04\0\0\0WAVE");
        assert_eq!(written.borrow().as_slice(), b"x\nAUDIO001.WAV\n");
    }

    #[test]
    fn receive_file_needs_a_size() {
        let comm = MockComm::new()
            .on_write(SEND_FILE, &[(0, b"SdFileTransfer: Send filename\r\n".as_slice())])
            .on_write(
                "MISSING.WAV",
                &[(0, b"SdFileTransfer: cannot open MISSING.WAV\r\n".as_slice())],
            );
        let mut device = tympan(comm);

        assert!(matches!(
            device.receive_file("MISSING.WAV", &mut io::sink()),
            Err(Error::Decode { .. })
        ));

        let mut silent = tympan(MockComm::new());
        let err = silent
            .receive_file("AUDIO001.WAV", &mut io::sink())
            .unwrap_err();
        assert!(err.is_timeout(), "unexpected error {:?}", err);
    }

    #[test]
    fn download_writes_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("AUDIO001.WAV");
        let mut device = tympan(transfer_script(b"RIFF\x04\0\0\0WAVE"));

        assert_eq!(device.download_file("AUDIO001.WAV", &path).unwrap(), 12);
        assert_eq!(std::fs::read(&path).unwrap(), b"RIFF\x04\0\0\0WAVE");
    }

    #[test]
    fn failed_download_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("AUDIO001.WAV");
        // announces 12 bytes but only sends 4
        let mut device = tympan(transfer_script(b"RIFF"));

        let err = device.download_file("AUDIO001.WAV", &path).unwrap_err();
        assert!(err.is_timeout(), "unexpected error {:?}", err);
        assert!(!path.exists());
    }
}
