//! vawk CLI - awk with named VCF columns
//!
//! ```bash
//! vawk '{ if (I$AF>0.5) print $1,$2 }' calls.vcf
//! vawk --header 'S$NA12878$GT=="0/1"' calls.vcf
//! zcat calls.vcf.gz | vawk -v MIN=30 '{ if (I$DP>=MIN) print $1,$2,S$*$GT }'
//! ```

use clap::{CommandFactory, Parser};
use tracing::Level;
use tracing_subscriber::EnvFilter;
use vawk::{
    assemble, run, validate_assignment, AssembledProgram, ColumnLayout, EngineConfig, Invocation,
    PipelineOptions, VawkError, VawkResult, STDIN_SENTINEL,
};

const CMD_HELP: &str = "\
vawk script. The syntax is exactly awk syntax with a few additions. The INFO
field can be split with the I$ prefix and the sample fields with the S$
prefix. For example, I$AF is the allele frequency of each variant and
S$NA12878 is the entire sample field of NA12878. S$* returns all samples,
tab separated.

A sample field can be split further by the keys in the FORMAT field (the
column after INFO). For example, S$NA12877$GT is the genotype of NA12877 and
S$*$GT the genotypes of all samples.

ex: '{ if (I$AF>0.5) print $1,$2,$3,I$AN,S$NA12878,S$NA12877$GT }'";

#[derive(Parser)]
#[command(name = "vawk")]
#[command(version, about = "An awk-like VCF parser", long_about = None)]
struct Cli {
    /// Declare an external awk variable
    #[arg(short = 'v', long = "var", value_name = "NAME=VALUE", value_parser = validate_assignment)]
    vars: Vec<String>,

    /// Column of the INFO field (1-based)
    #[arg(short, long, default_value_t = 8, value_parser = clap::value_parser!(u32).range(1..))]
    col: u32,

    /// Print VCF header lines
    #[arg(long)]
    header: bool,

    /// Print the generated program and debug logs to stderr
    #[arg(long)]
    debug: bool,

    /// awk binary to run (default: $VAWK_AWK, then gawk)
    #[arg(long, value_name = "PATH")]
    awk: Option<String>,

    /// vawk script
    #[arg(long_help = CMD_HELP)]
    cmd: String,

    /// VCF file (default: stdin)
    vcf: Option<String>,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.debug);

    let code = match execute(cli) {
        Ok(code) => code,
        Err(VawkError::MissingInput) => {
            let _ = Cli::command().print_help();
            1
        }
        Err(e) => {
            eprintln!("vawk: {}", e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

/// Logs go to stderr; stdout carries only engine output.
fn init_logging(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn execute(cli: Cli) -> VawkResult<i32> {
    let input = resolve_input(cli.vcf)?;

    let options = PipelineOptions {
        layout: ColumnLayout::new(cli.col as usize),
        echo_header: cli.header,
    };
    let program = assemble(&cli.cmd, &options)?;

    let engine = EngineConfig::from_env().with_override(cli.awk);
    let invocation = Invocation::new(engine.program, program.text.clone(), input).with_vars(cli.vars);

    if cli.debug {
        print_debug(&program, &options, &invocation);
    }

    let mut stdout = std::io::stdout().lock();
    let outcome = run(&invocation, &mut stdout)?;
    Ok(outcome.exit_code())
}

/// Explicit path, else stdin unless it is a terminal.
fn resolve_input(vcf: Option<String>) -> VawkResult<String> {
    match vcf {
        Some(path) => Ok(path),
        None if atty::is(atty::Stream::Stdin) => Err(VawkError::MissingInput),
        None => Ok(STDIN_SENTINEL.to_string()),
    }
}

fn print_debug(program: &AssembledProgram, options: &PipelineOptions, invocation: &Invocation) {
    eprintln!("== begin ==\n{}", program.segments.begin);
    eprintln!("== perline ==\n{}", program.segments.perline);
    eprintln!("== end ==\n{}", program.segments.end);

    let dump = serde_json::json!({
        "options": options,
        "references": program.references,
        "annotations": program.annotations,
        "samples": program.samples,
    });
    match serde_json::to_string_pretty(&dump) {
        Ok(json) => eprintln!("== references ==\n{}", json),
        Err(e) => eprintln!("== references ==\n(unavailable: {})", e),
    }

    eprintln!("== program ==\n{}", program.text);
    eprintln!("== command ==\n{}", invocation.command_line());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_script_long_help_explains_shorthand() {
        let mut cmd = Cli::command();
        let help = cmd.render_long_help().to_string();
        assert!(help.contains("I$AF"));
        assert!(help.contains("S$NA12877$GT"));
        assert!(help.contains("S$*"));
    }

    #[test]
    fn test_parse_arguments() {
        let cli = Cli::try_parse_from([
            "vawk", "-v", "MIN=3", "-c", "5", "--header", "{ print I$DP }", "in.vcf",
        ])
        .unwrap();
        assert_eq!(cli.vars, vec!["MIN=3"]);
        assert_eq!(cli.col, 5);
        assert!(cli.header);
        assert_eq!(cli.vcf.as_deref(), Some("in.vcf"));

        assert!(Cli::try_parse_from(["vawk", "-c", "0", "{ print }"]).is_err());
        assert!(Cli::try_parse_from(["vawk", "-v", "1X=2", "{ print }"]).is_err());
    }
}
