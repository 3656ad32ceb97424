use clap::{Parser, Subcommand};

use std::path::PathBuf;

use buildhelp::{die, find_repo_dir, info, log, reinterpret_path_for_chroot, warning, RunCommand};

/// shell-command helpers for build scripts
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Never emit ANSI color escapes.
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a command, logging it first
    Run {
        /// Working directory for the command
        #[arg(long, value_name = "DIR")]
        cwd: Option<PathBuf>,
        /// Text piped into the command's stdin
        #[arg(long, value_name = "TEXT")]
        input: Option<String>,
        /// Capture stdout and print it once the command finishes
        #[arg(long)]
        capture_stdout: bool,
        /// Capture stderr so it can be reported on failure
        #[arg(long)]
        capture_stderr: bool,
        /// Run through the chroot entry script
        #[arg(long)]
        enter_chroot: bool,
        /// Do not log the command before running it
        #[arg(long)]
        quiet: bool,
        /// Warn instead of failing when the command fails
        #[arg(long)]
        error_ok: bool,
        /// Message reported when the command fails
        #[arg(long, value_name = "MSG")]
        error_message: Option<String>,
        /// Print the exit status and exit with it instead of failing
        #[arg(long, conflicts_with = "json")]
        exit_code: bool,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
        /// Label used in the logged command line
        #[arg(long, value_name = "LABEL")]
        caller: Option<String>,
        #[arg(required = true, trailing_var_arg = true)]
        cmd: Vec<String>,
    },

    /// Print the nearest directory containing `.repo`
    RepoDir { path: Option<PathBuf> },

    /// Print where PATH lives inside the chroot
    ChrootPath { path: PathBuf },

    /// Log an informational message
    Info { message: String },

    /// Log a warning
    Warning { message: String },

    /// Log an error and exit 1
    Die { message: String },
}

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        log::init_color(false);
    }

    if let Err(err) = dispatch(cli.command) {
        die(&err.to_string());
    }
}

fn dispatch(command: Commands) -> buildhelp::Result<()> {
    match command {
        Commands::Run {
            cwd,
            input,
            capture_stdout,
            capture_stderr,
            enter_chroot,
            quiet,
            error_ok,
            error_message,
            exit_code,
            json,
            caller,
            cmd,
        } => {
            let mut run = RunCommand::new(cmd)
                .redirect_stdout(capture_stdout || json)
                .redirect_stderr(capture_stderr || json)
                .enter_chroot(enter_chroot)
                .print_cmd(!quiet)
                .error_ok(error_ok);
            if let Some(dir) = cwd {
                run = run.cwd(dir);
            }
            if let Some(text) = input {
                run = run.input(text);
            }
            if let Some(msg) = error_message {
                run = run.error_message(msg);
            }
            if let Some(label) = caller {
                run = run.caller(label);
            }

            if exit_code {
                let code = run.status()?;
                println!("{code}");
                std::process::exit(code);
            }

            let output = run.run()?;
            if json {
                let rendered = serde_json::to_string_pretty(&output)
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
                println!("{rendered}");
            } else {
                print!("{}", output.stdout);
            }
            Ok(())
        }
        Commands::RepoDir { path } => match find_repo_dir(path.as_deref())? {
            Some(dir) => {
                println!("{}", dir.display());
                Ok(())
            }
            None => die("no .repo directory found"),
        },
        Commands::ChrootPath { path } => {
            println!("{}", reinterpret_path_for_chroot(&path)?.display());
            Ok(())
        }
        Commands::Info { message } => {
            info(&message);
            Ok(())
        }
        Commands::Warning { message } => {
            warning(&message);
            Ok(())
        }
        Commands::Die { message } => die(&message),
    }
}
