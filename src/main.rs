//! W Machine - CLI Entry Point
//!
//! Commands:
//! - `wmachine run <script>` - Run a microprogram script
//! - `wmachine check <script>` - Parse a script without running it
//! - `wmachine panel` - Interactive front panel
//! - `wmachine defaults` - Print the default panel config
//! - `wmachine test` - Built-in self-test

use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;
use wmachine::{ControlUnit, PanelConfig, RegisterId};

#[derive(Parser)]
#[command(name = "wmachine")]
#[command(version = "0.1.0")]
#[command(about = "A control-unit simulator for the W teaching machine")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a microprogram script, one clock pulse per line
    Run {
        /// Path to the script
        script: String,
        /// Memory image to load first (default: the panel demo memory)
        #[arg(short, long)]
        memory: Option<String>,
        /// Print registers after every pulse
        #[arg(short, long)]
        trace: bool,
    },
    /// Check a script for unknown, repeated or conflicting signals
    Check {
        /// Path to the script
        script: String,
    },
    /// Interactive front panel in the terminal
    Panel {
        /// Memory image to load (overrides the config memory)
        #[arg(short, long)]
        memory: Option<String>,
        /// Panel config JSON
        #[arg(short, long)]
        config: Option<String>,
        /// Write logs to this file
        #[arg(short, long)]
        log: Option<String>,
    },
    /// Print the default panel config as JSON
    Defaults,
    /// Run the built-in self-test
    Test,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run { script, memory, trace }) => {
            init_logging();
            run_script(&script, memory.as_deref(), trace);
        }
        Some(Commands::Check { script }) => {
            init_logging();
            check_script(&script);
        }
        Some(Commands::Panel { memory, config, log }) => {
            if let Some(path) = &log {
                init_file_logging(path);
            }
            open_panel(memory.as_deref(), config.as_deref());
        }
        Some(Commands::Defaults) => {
            println!("{}", PanelConfig::default().to_json());
        }
        Some(Commands::Test) => {
            run_self_test();
        }
        None => {
            println!("W Machine v0.1.0");
            println!("A control-unit simulator for the W teaching machine");
            println!();
            println!("Use --help for available commands");
            println!();
            demo_fetch_cycle();
        }
    }
}

// See
// https://docs.rs/tracing-subscriber/latest/tracing_subscriber/fmt/index.html#filtering-events-with-environment-variables
// for selecting which events get printed.
fn env_filter() -> tracing_subscriber::EnvFilter {
    match tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))
    {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("❌ Invalid log filter: {}", e);
            std::process::exit(1);
        }
    }
}

/// Log to stderr so command output on stdout stays clean.
fn init_logging() {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .init();
}

/// Log to a file; the terminal belongs to the panel.
fn init_file_logging(path: &str) {
    let file = match std::fs::File::create(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("❌ Failed to open log file: {}", e);
            std::process::exit(1);
        }
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file));

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .init();
}

fn read_source(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("❌ Failed to read file: {}", e);
            std::process::exit(1);
        }
    }
}

fn build_unit(config: &PanelConfig, memory: Option<&str>) -> ControlUnit {
    let mut unit = match config.build_unit() {
        Ok(unit) => unit,
        Err(e) => {
            eprintln!("❌ Bad config memory: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(path) = memory {
        let cells = match wmachine::load_image(path) {
            Ok(cells) => cells,
            Err(e) => {
                eprintln!("❌ Failed to load memory image: {}", e);
                std::process::exit(1);
            }
        };
        if let Err(e) = unit.load_memory(&cells) {
            eprintln!("❌ Failed to load memory image: {}", e);
            std::process::exit(1);
        }
        println!("📂 Loaded {} memory cells", cells.len());
    }

    unit
}

fn print_registers(unit: &ControlUnit) {
    for id in RegisterId::ALL {
        let value = unit.registers().get(id);
        println!("{:>5}: {:0width$b} ({})", id.name(), value, value, width = id.width() as usize);
    }
}

fn run_script(path: &str, memory: Option<&str>, trace: bool) {
    println!("🔧 Running: {}", path);

    let source = read_source(path);
    let program = match wmachine::script::parse(&source) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("❌ Script error: {}", e);
            std::process::exit(1);
        }
    };

    let mut unit = build_unit(&PanelConfig::default(), memory);

    println!();
    println!("━━━ Execution ━━━");

    let result = wmachine::script::run_traced(&mut unit, &program, |step, unit| {
        if trace {
            let regs = unit.registers();
            println!(
                "{:03}: {:<24} L={} A={} I={} AK={} S={}",
                step.line,
                step.signals.to_string(),
                regs.l, regs.a, regs.i, regs.ak, regs.s
            );
        }
    });

    if let Err(e) = result {
        eprintln!("❌ Execution error: {}", e);
        std::process::exit(1);
    }

    println!();
    println!("━━━ Result ━━━");
    println!("Pulses: {}", unit.pulses());
    print_registers(&unit);
}

fn check_script(path: &str) {
    let source = read_source(path);
    match wmachine::script::parse(&source) {
        Ok(program) => {
            println!("✓ {} microinstructions", program.len());
            print!("{}", wmachine::script::format(&program));
        }
        Err(e) => {
            eprintln!("❌ Script error: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(feature = "tui")]
fn open_panel(memory: Option<&str>, config: Option<&str>) {
    let config = match config {
        Some(path) => match PanelConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => PanelConfig::default(),
    };

    let unit = build_unit(&config, memory);

    if let Err(e) = wmachine::run_panel(&config, unit) {
        eprintln!("❌ Panel error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "tui"))]
fn open_panel(_memory: Option<&str>, _config: Option<&str>) {
    eprintln!("❌ Built without the terminal panel (feature `tui`)");
    std::process::exit(1);
}

fn demo_fetch_cycle() {
    use wmachine::script;

    println!("━━━ Fetch Cycle Demo ━━━");
    println!();

    let source = "WYL WEA\nCZYT WYS WEI IL\nWYAD WEA\nCZYT WYS WEJA\nPRZEP\n";
    let program = match script::parse(source) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("❌ Script error: {}", e);
            std::process::exit(1);
        }
    };

    let mut unit = build_unit(&PanelConfig::default(), None);
    let result = script::run_traced(&mut unit, &program, |step, unit| {
        let regs = unit.registers();
        println!(
            "  TAKT {}: {:<18} L={} A={} I={} AK={}",
            unit.pulses(),
            step.signals.to_string(),
            regs.l, regs.a, regs.i, regs.ak
        );
    });

    if let Err(e) = result {
        eprintln!("❌ Execution error: {}", e);
        std::process::exit(1);
    }

    println!();
    println!("✓ Loaded the instruction at PaO[0], then its operand into AK.");
}

fn run_self_test() {
    use wmachine::{Signal, Word5, Word8};
    use wmachine::binary::arith;

    println!("━━━ W Machine Self-Test ━━━");
    println!();

    let mut passed = 0;
    let mut failed = 0;

    // Test 1: Arming twice disarms
    print!("Arm toggles... ");
    let mut unit = ControlUnit::new();
    let ok = unit.arm_signal(Signal::Wyl).is_ok()
        && unit.arm_signal(Signal::Wyl).is_ok()
        && unit.armed().is_empty();
    if ok { println!("✓"); passed += 1; }
    else { println!("✗"); failed += 1; }

    // Test 2: Conflicts are refused
    print!("CZYT/PISZ conflict refused... ");
    let mut unit = ControlUnit::new();
    let ok = unit.arm_signal(Signal::Czyt).is_ok()
        && unit.arm_signal(Signal::Pisz).is_err()
        && unit.armed().len() == 1;
    if ok { println!("✓"); passed += 1; }
    else { println!("✗"); failed += 1; }

    // Test 3: Subtraction wraps like the hardware
    print!("Borrow subtraction... ");
    let mut ok = true;
    for (a, b) in [(5u8, 3u8), (0, 1), (200, 201), (255, 255)] {
        let diff = arith::subtract(Word8::truncate(a), Word8::truncate(b));
        if diff.value() != a.wrapping_sub(b) {
            ok = false;
            break;
        }
    }
    if ok { println!("✓"); passed += 1; }
    else { println!("✗"); failed += 1; }

    // Test 4: Address narrowing
    print!("WYAD keeps low 5 bits... ");
    let narrowed: Word5 = arith::narrow(Word8::truncate(0b1110_0110));
    if narrowed.value() == 0b00110 {
        println!("✓");
        passed += 1;
    } else {
        println!("✗ (got {}, expected 6)", narrowed.value());
        failed += 1;
    }

    // Test 5: Memory read in one pulse
    print!("CZYT reads PaO[A]... ");
    let mut unit = ControlUnit::new();
    let mut image = vec![Word8::zero(); 11];
    image[10] = Word8::truncate(0b1010_1010);
    let loaded = unit.load_memory(&image).is_ok();
    let mut script_ok = loaded;
    for _ in 0..10 {
        script_ok &= unit.arm_signal(Signal::Il).is_ok();
        unit.pulse();
    }
    script_ok &= unit.arm_signal(Signal::Wyl).is_ok() && unit.arm_signal(Signal::Wea).is_ok();
    unit.pulse();
    script_ok &= unit.arm_signal(Signal::Czyt).is_ok();
    unit.pulse();
    if script_ok && unit.registers().s.value() == 0b1010_1010 {
        println!("✓");
        passed += 1;
    } else {
        println!("✗ (got {})", unit.registers().s.value());
        failed += 1;
    }

    // Test 6: Config defaults parse back
    print!("Config JSON round trip... ");
    let config = PanelConfig::default();
    if PanelConfig::from_json(&config.to_json()).map(|c| c == config).unwrap_or(false) {
        println!("✓");
        passed += 1;
    } else {
        println!("✗");
        failed += 1;
    }

    println!();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Results: {} passed, {} failed", passed, failed);

    if failed == 0 {
        println!("✓ All tests passed!");
    } else {
        std::process::exit(1);
    }
}
