use catimg::batch::{compare_compression, convert_directory, Target};
use catimg::container::{cat_to_png, png_to_cat, read_info, CatError};
use catimg::viewer::view;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process;

// Use clap to define the argument list.

#[derive(Parser, Debug)]
#[command(about = "Converts and inspects CAT image files", long_about = None)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Converts an image between PNG and CAT, the direction is picked from
    /// the file extensions.
    Convert {
        /// The input file.
        #[arg(short, long)]
        input: PathBuf,

        /// The output file.
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Shows a CAT file in the terminal.
    View {
        /// The CAT file to show.
        #[arg(short, long)]
        file: PathBuf,

        /// Scale applied before fitting the image to the terminal.
        #[arg(short, long, default_value_t = 1.0)]
        scale: f32,
    },
    /// Prints the header information of a CAT file.
    Info {
        /// The CAT file to inspect.
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Converts every matching file of a directory.
    Batch {
        /// The input directory.
        #[arg(short, long)]
        input: PathBuf,

        /// The output directory, created if missing.
        #[arg(short, long)]
        output: PathBuf,

        /// The target format.
        #[arg(short, long, value_enum)]
        format: Format,
    },
    /// Compares PNG and CAT sizes for every PNG of a directory.
    Analyze {
        /// The directory holding the PNG files.
        #[arg(short, long)]
        dir: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Cat,
    Png,
}

impl From<Format> for Target {
    fn from(format: Format) -> Target {
        match format {
            Format::Cat => Target::Cat,
            Format::Png => Target::Png,
        }
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

fn fail(message: String) -> ! {
    eprintln!("{}", message);
    process::exit(1)
}

fn require_file(path: &Path) {
    if !path.is_file() {
        fail(format!("File not found: {}", path.display()));
    }
}

fn convert(input: PathBuf, output: PathBuf) {
    require_file(&input);

    let result: Result<&str, CatError> = match (
        extension(&input).as_str(),
        extension(&output).as_str(),
    ) {
        ("png", "cat") => png_to_cat(&input, &output).map(|_| "PNG -> CAT"),
        ("cat", "png") => cat_to_png(&input, &output).map(|_| "CAT -> PNG"),
        _ => fail("Only PNG <-> CAT conversions are supported".to_string()),
    };

    match result {
        Ok(direction) => println!("Converted {}: {}", direction, output.display()),
        Err(e) => fail(format!("Cannot convert image: {}", e)),
    }
}

fn show(file: PathBuf, scale: f32) {
    require_file(&file);
    if extension(&file) != "cat" {
        fail("Only .cat files can be viewed".to_string());
    }

    match view(&file, scale) {
        Ok(text) => println!("{}", text),
        Err(e) => fail(format!("Cannot show image: {}", e)),
    }
}

fn info(file: PathBuf) {
    require_file(&file);

    let info = match read_info(&file) {
        Ok(info) => info,
        Err(e) => fail(format!("Cannot read image information: {}", e)),
    };

    println!("=== CAT image information ===");
    println!("Width:       {}px", info.width);
    println!("Height:      {}px", info.height);
    println!("File size:   {} bytes", info.file_size);
    println!("Compression: {:.2}%", info.compression_ratio);
    println!("Created:     {}", info.created_string());
}

fn batch(input: PathBuf, output: PathBuf, format: Format) {
    let report = match convert_directory(&input, &output, format.into()) {
        Ok(report) => report,
        Err(e) => fail(format!("Batch conversion failed: {}", e)),
    };

    if report.found() == 0 {
        let target: Target = format.into();
        println!(
            "No .{} files found in {}",
            target.source_extension(),
            input.display()
        );
        return;
    }

    println!("Found {} files to convert...", report.found());
    for item in &report.items {
        match &item.result {
            Ok(()) => println!("ok   {} -> {}", item.source.display(), item.output.display()),
            Err(e) => println!("fail {}: {}", item.source.display(), e),
        }
    }
    println!(
        "\nDone! Converted: {}, failed: {}",
        report.converted(),
        report.failed()
    );
}

fn analyze(dir: PathBuf) {
    let report = match compare_compression(&dir) {
        Ok(report) => report,
        Err(e) => fail(format!("Analysis failed: {}", e)),
    };

    if report.entries.is_empty() && report.failures.is_empty() {
        println!("No PNG files found for analysis");
        return;
    }

    println!("=== Compression analysis ===\n");
    for entry in &report.entries {
        println!("{}:", entry.file.display());
        println!("  PNG:     {} bytes", entry.png_size);
        println!("  CAT:     {} bytes", entry.cat_size);
        println!("  Ratio:   {:.1}%", entry.ratio());
        println!("  Savings: {} bytes\n", entry.savings());
    }
    for (file, e) in &report.failures {
        println!("Cannot analyze {}: {}\n", file.display(), e);
    }

    // Every file failed, there is nothing to sum up.
    let Some(ratio) = report.total_ratio() else {
        return;
    };
    println!("=== Total ===");
    println!("PNG size:      {} bytes", report.total_png());
    println!("CAT size:      {} bytes", report.total_cat());
    println!("Overall ratio: {:.1}%", ratio);
    println!("Total savings: {} bytes", report.total_savings());
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    match args.command {
        Command::Convert { input, output } => convert(input, output),
        Command::View { file, scale } => show(file, scale),
        Command::Info { file } => info(file),
        Command::Batch {
            input,
            output,
            format,
        } => batch(input, output, format),
        Command::Analyze { dir } => analyze(dir),
    }
}
