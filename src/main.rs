use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    time::Duration,
};

use clap::{Parser, Subcommand};
use log::error;
use tympan::{
    commands::{Calibration, CalibrationTable, SdTransfer},
    config::{PortConfig, SweepSpeed},
    parse::keep_filenames_of_type,
    Tympan,
};

/// Talk to a Tympan over its USB serial port
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Serial port of the Tympan, e.g. /dev/ttyACM0 or COM26
    #[arg(long, short)]
    port: String,

    /// Baud rate (the Tympan's USB serial ignores it)
    #[arg(long, default_value_t = 115_200)]
    baud: u32,

    /// Longest wait for a single line, in seconds
    #[arg(long, default_value_t = 0.5)]
    timeout: f64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the Tympan's help menu
    HelpMenu,

    /// Run the stepped-tone calibration sweep and print the measured levels
    Calibrate {
        /// Shorten each step to 0.2 s
        #[arg(long)]
        fast: bool,

        /// Also write the table as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// List the files on the SD card
    List {
        /// Only show files with this extension (repeatable)
        #[arg(long = "type", short = 't')]
        types: Vec<String>,
    },

    /// Copy a file from the SD card to local disk
    Get {
        /// File on the SD card; defaults to the last file of the accepted types
        name: Option<String>,

        /// Accepted extensions when no name is given (repeatable)
        #[arg(long = "type", short = 't', default_value = "wav")]
        types: Vec<String>,

        /// Local file to write; defaults to the name on the SD card
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.timeout.is_finite() || cli.timeout <= 0.0 {
        return Err(format!("invalid timeout {}", cli.timeout).into());
    }
    let config = PortConfig {
        path: cli.port,
        baud_rate: cli.baud,
        read_timeout: Duration::from_secs_f64(cli.timeout),
    };

    println!("Opening {} (make sure no serial monitor has it open)", config.path);
    let mut device = Tympan::open(&config)?;
    device.clear_reply_buffer()?;

    match cli.command {
        Command::HelpMenu => {
            let reply = device.help()?;
            println!("{}", reply.trim_end());
        }
        Command::Calibrate { fast, csv } => {
            let speed = if fast {
                SweepSpeed::Fast
            } else {
                SweepSpeed::Standard
            };
            let table = device.run_calibration(speed)?;
            print_table(&table);
            if let Some(path) = csv {
                write_csv(&table, &path)?;
                println!("Wrote {}", path.display());
            }
        }
        Command::List { types } => {
            let mut names = device.list_files()?;
            if !types.is_empty() {
                names = keep_filenames_of_type(&names, &types);
            }
            for name in names {
                println!("{}", name);
            }
        }
        Command::Get { name, types, out } => {
            let name = match name {
                Some(name) => name,
                None => {
                    let names = keep_filenames_of_type(&device.list_files()?, &types);
                    names
                        .last()
                        .cloned()
                        .ok_or_else(|| format!("no files of type {:?} on the SD card", types))?
                }
            };
            let local_path = match out {
                Some(path) => path,
                None => local_file_name(&name)?,
            };
            println!("Receiving {}", name);
            let len = device.download_file(&name, &local_path)?;
            println!("Saved {} bytes as {}", len, local_path.display());
        }
    }

    device.close();
    Ok(())
}

/// Local path for an SD card file: its last path component, in the current directory
fn local_file_name(name: &str) -> Result<PathBuf, String> {
    let last = name.rsplit(['/', '\\']).next().unwrap_or_default();
    match Path::new(last).file_name() {
        Some(file_name) if file_name == last => Ok(PathBuf::from(file_name)),
        _ => Err(format!("no usable local file name in {:?}; pass --out", name)),
    }
}

fn print_table(table: &CalibrationTable) {
    print!("{:>6} {:>12}", "step", "freq (Hz)");
    for channel in 0..table.channel_count() {
        print!(" {:>12}", format!("ch{} (dBFS)", channel));
    }
    println!();
    for row in table.rows() {
        print!("{:>6} {:>12.2}", row.test_id, row.freq_hz);
        for level in &row.levels_dbfs {
            print!(" {:>12.3}", level);
        }
        println!();
    }
}

fn write_csv(table: &CalibrationTable, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec!["test_id".to_owned(), "freq_hz".to_owned()];
    header.extend((0..table.channel_count()).map(|c| format!("level_{}_dbfs", c)));
    writer.write_record(&header)?;

    for row in table.rows() {
        let mut record = vec![row.test_id.to_string(), row.freq_hz.to_string()];
        record.extend(row.levels_dbfs.iter().map(|l| l.to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
