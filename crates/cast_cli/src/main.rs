use anyhow::{bail, Context, Result};
use forge_cast::{
    AliasTable, Assembly, CastConfig, CastError, Model, PackageBuilder, PhpSymbols, Symbol,
    Target,
};
use std::{
    env,
    path::{Path, PathBuf},
    process,
};
use tracing::{debug, info, warn};

const DEFAULT_CONFIG: &str = "forge-cast.toml";

fn usage() {
    eprintln!("forge-cast <generate|symbols> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  generate                       Write the Python package for an assembly");
    eprintln!("  symbols                        Print the symbol table of an assembly");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <file>                Configuration file (default: ./{})", DEFAULT_CONFIG);
    eprintln!("  --assembly <file>              Assembly IR (JSON)");
    eprintln!("  --dep <file>                   Dependency assembly IR, repeatable");
    eprintln!("  --output <dir>                 Output directory (generate)");
    eprintln!("  --no-runtime-type-checking     Skip runtime type checks (generate)");
    eprintln!("  --dry-run                      List files without writing them (generate)");
    eprintln!("  --target <python|php>          Symbol table to print (symbols)");
    eprintln!("  --verbose                      Debug logging");
    eprintln!();
    eprintln!("Logging is controlled by FORGE_CAST_LOG (e.g. FORGE_CAST_LOG=forge_cast=debug).");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Generate,
    Symbols,
}

/// Command line options, before merging with the configuration file
#[derive(Debug, Default, PartialEq)]
struct Options {
    config: Option<PathBuf>,
    assembly: Option<PathBuf>,
    deps: Vec<PathBuf>,
    output: Option<PathBuf>,
    no_runtime_type_checking: bool,
    dry_run: bool,
    verbose: bool,
    target: Option<Target>,
}

fn parse_args(args: &[String]) -> Result<(Command, Options)> {
    let Some((cmd, rest)) = args.split_first() else {
        bail!("Missing command");
    };
    let command = match cmd.as_str() {
        "generate" => Command::Generate,
        "symbols" => Command::Symbols,
        other => bail!("Unknown command: {}", other),
    };

    let mut options = Options::default();
    let mut i = 0;
    while i < rest.len() {
        let flag = rest[i].as_str();
        let mut value = || -> Result<String> {
            i += 1;
            match rest.get(i) {
                Some(v) => Ok(v.clone()),
                None => bail!("{} requires a value", flag),
            }
        };
        match (command, flag) {
            (_, "--config") => options.config = Some(PathBuf::from(value()?)),
            (_, "--assembly") => options.assembly = Some(PathBuf::from(value()?)),
            (_, "--dep") => options.deps.push(PathBuf::from(value()?)),
            (_, "--verbose" | "-v") => options.verbose = true,
            (Command::Generate, "--output" | "-o") => options.output = Some(PathBuf::from(value()?)),
            (Command::Generate, "--no-runtime-type-checking") => options.no_runtime_type_checking = true,
            (Command::Generate, "--dry-run") => options.dry_run = true,
            (Command::Symbols, "--target") => options.target = Some(value()?.parse()?),
            _ => bail!("Unknown argument: {}", flag),
        }
        i += 1;
    }
    Ok((command, options))
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("FORGE_CAST_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Configuration file with the command line applied on top
fn load_config(options: &Options) -> Result<CastConfig> {
    let mut config = match &options.config {
        Some(path) => CastConfig::load(path)
            .with_context(|| format!("Failed to load config at {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG).exists() => CastConfig::load(DEFAULT_CONFIG)
            .with_context(|| format!("Failed to load config at {}", DEFAULT_CONFIG))?,
        None => CastConfig::default(),
    };

    let generate = &mut config.generate;
    if let Some(assembly) = &options.assembly {
        generate.assembly = Some(assembly.clone());
    }
    if !options.deps.is_empty() {
        generate.dependencies = options.deps.clone();
    }
    if let Some(output) = &options.output {
        generate.output = Some(output.clone());
    }
    if options.no_runtime_type_checking {
        generate.runtime_type_checking = false;
    }
    Ok(config)
}

fn load_assembly(path: &Path) -> Result<Assembly> {
    Assembly::load(path).with_context(|| format!("Failed to read assembly at {}", path.display()))
}

/// Assembly (with module overrides merged) and its dependencies
fn load_inputs(config: &CastConfig) -> Result<(Assembly, Vec<Assembly>)> {
    let Some(path) = &config.generate.assembly else {
        bail!("No assembly given (use --assembly or [generate].assembly)");
    };
    let mut assembly = load_assembly(path)?;
    config
        .apply(&mut assembly)
        .context("Failed to apply module overrides")?;

    let deps = config
        .generate
        .dependencies
        .iter()
        .map(|dep| load_assembly(dep))
        .collect::<Result<Vec<_>>>()?;
    debug!(assembly = %assembly.name, dependencies = deps.len(), "inputs loaded");
    Ok((assembly, deps))
}

fn cmd_generate(config: &CastConfig, dry_run: bool) -> Result<()> {
    let (assembly, deps) = load_inputs(config)?;
    let generate = &config.generate;

    if generate.targets.contains(&Target::Php) {
        warn!("The php target has no source emitter; only python is generated");
    }
    if !generate.targets.contains(&Target::Python) {
        info!("python is not among the configured targets, nothing to generate");
        return Ok(());
    }

    let name = assembly.name.clone();
    let mut builder = PackageBuilder::new(assembly)
        .dependencies(deps)
        .runtime_type_checking(generate.runtime_type_checking);

    if dry_run {
        let files = builder
            .generate()
            .with_context(|| format!("Failed to generate {}", name))?;
        for (path, content) in &files {
            println!("{:>8}  {}", content.len(), path.display());
        }
        return Ok(());
    }

    let Some(output) = &generate.output else {
        bail!("No output directory given (use --output or [generate].output)");
    };
    builder = builder.output_dir(output);
    let output = builder
        .build()
        .with_context(|| format!("Failed to generate {}", name))?;

    println!(
        "Generated {} ({} modules, {} files, {} bytes) in {}",
        name,
        output.modules,
        output.files.len(),
        output.bytes,
        output.root.display()
    );
    Ok(())
}

fn print_row(fqn: &str, kind: &str, name: &str, namespace: &str) {
    println!("{:<48} {:<10} {:<40} {}", fqn, kind, name, namespace);
}

fn cmd_symbols(config: &CastConfig, target: Target) -> Result<()> {
    let (assembly, deps) = load_inputs(config)?;
    print_row("FQN", "KIND", "TARGET NAME", "NAMESPACE");

    match target {
        Target::Python => {
            let model = Model::build(assembly, deps).context("Failed to build the model")?;
            for decl in model.symbols().iter() {
                let name = if decl.kind().is_type() {
                    model.python_fqn(&decl.fqn)?.python_fqn
                } else {
                    decl.name.clone()
                };
                print_row(&decl.fqn, decl.kind().display(), &name, &decl.namespace);
            }

            let aliases = AliasTable::collect(&model)?;
            aliases.verify()?;
            println!();
            println!("{}", serde_json::to_string_pretty(&aliases)?);
        }
        Target::Php => {
            let symbols = PhpSymbols::build(&assembly)?;
            for symbol in symbols.table().iter() {
                print_row(&symbol.fqn, symbol.kind().display(), &symbol.name, &symbol.namespace);
            }
        }
    }
    Ok(())
}

fn run(command: Command, options: Options) -> Result<()> {
    let config = load_config(&options)?;
    match command {
        Command::Generate => cmd_generate(&config, options.dry_run),
        Command::Symbols => cmd_symbols(&config, options.target.unwrap_or(Target::Python)),
    }
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        usage();
        process::exit(2);
    }

    let (command, options) = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("Error: {}", err);
            eprintln!();
            usage();
            process::exit(2);
        }
    };

    init_logging(options.verbose);

    if let Err(err) = run(command, options) {
        match err.downcast_ref::<CastError>() {
            Some(cast) => eprintln!("Error ({}): {:#}", cast.category(), err),
            None => eprintln!("Error: {:#}", err),
        }
        process::exit(1);
    }
}
