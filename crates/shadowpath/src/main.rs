use clap::Parser;
use shadowpath_common::ShadowPath;
use shadowpath_common::protocol::{ElementRef, FindInShadowsRequest};
use shadowpath_engine::backend::Backend;
use shadowpath_engine::config::{ConfigLoader, ShadowPathConfig};
use shadowpath_engine::executor::QueryExecutor;
use shadowpath_engine::formatter::{OutputFormat, format_results};
use shadowpath_h::backend::HeadlessBackend;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "shadowpath",
    version,
    about = "Find elements inside nested shadow DOM trees"
)]
struct Args {
    /// Page to open
    #[arg(long)]
    url: String,

    /// Selector of the elements to find
    #[arg(long, required_unless_present = "args", conflicts_with = "args")]
    target: Option<String>,

    /// Shadow host selector; repeat to descend further, outermost first
    #[arg(long = "host", value_name = "SELECTOR")]
    hosts: Vec<String>,

    /// Positional arguments as JSON, e.g. '["p", ["x-app"], null]'
    #[arg(long, conflicts_with = "hosts")]
    args: Option<String>,

    /// Launch browser in visible mode (not headless)
    #[arg(long)]
    visible: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Config file (defaults to ./shadowpath.yaml or ~/.shadowpath/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// How long to poll for matches, in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
}

impl Args {
    fn request(&self) -> Result<FindInShadowsRequest, Box<dyn std::error::Error>> {
        if let Some(raw) = &self.args {
            return Ok(serde_json::from_str(raw)?);
        }
        let target = self.target.clone().ok_or("--target is required")?;
        let path: ShadowPath = self.hosts.iter().map(String::as_str).collect();
        Ok(FindInShadowsRequest::new(target, path))
    }
}

async fn load_config(args: &Args) -> Result<ShadowPathConfig, Box<dyn std::error::Error>> {
    let mut config = ConfigLoader::load(args.config.as_deref()).await?;

    if args.visible {
        config.browser.visible = true;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.query.timeout_ms = timeout_ms;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so stdout carries only results.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let request = args.request()?;
    let config = load_config(&args).await?;

    let mut backend = HeadlessBackend::with_settings(config.browser.clone());
    if let Err(e) = backend.launch().await {
        eprintln!("Failed to launch backend: {}", e);
        return Err(e.into());
    }

    let executor = QueryExecutor::new(config.query.clone());
    let outcome = run(&mut backend, &executor, &args.url, &request).await;
    backend.close().await?;

    let results = outcome?;
    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    println!("{}", format_results(&results, format));
    Ok(())
}

async fn run(
    backend: &mut HeadlessBackend,
    executor: &QueryExecutor,
    url: &str,
    request: &FindInShadowsRequest,
) -> Result<Vec<ElementRef>, Box<dyn std::error::Error>> {
    executor.open(backend, url).await?;
    Ok(executor.find(backend, request).await?)
}
