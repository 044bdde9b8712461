use clap::Parser;
use miette::Result;
use spokes::cli::{Cli, Commands};
use spokes::core::{Config, Project};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    let project = match &global.project {
        Some(path) => Project::discover_from(path).ok(),
        None => Project::discover().ok(),
    };
    let config = Config::load_for(project.as_ref());
    let default_level = match cli.command {
        Commands::Serve(_) => "info",
        _ => "warn",
    };
    spokes::logging::init(&spokes::logging::filter_directive(
        global.verbose,
        config.log_level.as_deref(),
        default_level,
    ));

    match cli.command {
        Commands::Init(args) => spokes::cli::commands::init::run(args),
        Commands::Article(cmd) => spokes::cli::commands::article::run(cmd, &global),
        Commands::Seed(args) => spokes::cli::commands::seed::run(args, &global),
        Commands::Import(args) => spokes::cli::commands::import::run(args, &global),
        Commands::Serve(args) => spokes::cli::commands::serve::run(args, &global),
        Commands::Completions(args) => spokes::cli::commands::completions::run(args),
    }
}
