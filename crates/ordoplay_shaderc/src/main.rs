// SPDX-License-Identifier: MIT OR Apache-2.0
//! `OrdoPlay` shader compiler - command line front end
//!
//! Loads a shader graph saved by the editor (RON), compiles it for one
//! backend and writes the vertex and pixel sources together with the program
//! artifact (uniforms, samplers, render state) that the runtime loads.
//!
//! ```text
//! ordoplay_shaderc lit.ron --backend hlsl --out-dir build/shaders
//! ```

mod args;
mod error;
mod output;

use args::{Args, USAGE};
use error::CliError;
use ordoplay_shader_compiler::{CompilerSettings, ShaderCompiler};
use ordoplay_shader_graph::Graph;
use std::path::Path;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() {
    let parsed = Args::parse(std::env::args().skip(1));
    let verbose = matches!(&parsed, Ok(Some(args)) if args.verbose);
    init_tracing(verbose);

    let args = match parsed {
        Ok(Some(args)) => args,
        Ok(None) => {
            println!("{USAGE}");
            return;
        }
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };

    tracing::info!("Starting OrdoPlay shader compiler v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env();
    for target in ["ordoplay_shader_compiler", "ordoplay_shaderc"] {
        if let Ok(directive) = format!("{target}={level}").parse() {
            env_filter = env_filter.add_directive(directive);
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(args: &Args) -> Result<(), CliError> {
    let mut settings = match &args.settings {
        Some(path) => CompilerSettings::load(path)?,
        None => CompilerSettings::default(),
    };
    if let Some(backend) = args.backend {
        settings.backend = backend;
    }

    let graph = load_graph(&args.graph)?;
    tracing::info!(
        "Compiling '{}' ({} nodes) for {}",
        graph.name,
        graph.node_count(),
        settings.backend
    );

    let artifact = ShaderCompiler::new(settings).compile(&graph)?;

    match &args.out_dir {
        Some(dir) => {
            let stem = args
                .graph
                .file_stem()
                .map_or_else(|| graph.name.clone(), |s| s.to_string_lossy().into_owned());
            let files = output::write_outputs(dir, &stem, &artifact, args.format)?;
            tracing::info!("Wrote {} files to {}", files.len(), dir.display());
        }
        None => print!("{}", output::listing(&artifact)),
    }
    Ok(())
}

fn load_graph(path: &Path) -> Result<Graph, CliError> {
    let source = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Graph::from_ron(&source)?)
}
