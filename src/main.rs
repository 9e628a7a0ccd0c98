use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use log::{debug, error};

use prompt_enhancer::config::{validate_temperature, EnhancerConfig};
use prompt_enhancer::flow::{FlowOutcome, PromptFlow};
use prompt_enhancer::request::PromptRequest;
use prompt_enhancer::{ChatModel, CompletionClient, Complexity, EnhancerBackend, Error};

#[derive(Parser)]
#[command(name = "prompt-enhancer", version)]
#[command(about = "Turn a few fields into a structured prompt and ask a chat model")]
struct Cli
{   #[command(subcommand)]
    command: Commands
  , /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>
  , /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool
}

#[derive(Subcommand)]
enum Commands
{   /// Role / context / task form
    Enhance
    {   #[arg(long)]
        role: Option<String>
      , #[arg(long)]
        context: Option<String>
      , #[arg(long)]
        task: Option<String>
      , #[command(flatten)]
        opts: CompletionArgs
    }
  , /// Prompt type / target model / complexity form
    Design
    {   #[arg(long)]
        prompt_type: Option<String>
      , #[arg(long)]
        target_model: Option<String>
      , #[arg(long, value_parser = parse_complexity)]
        complexity: Option<Complexity>
      , #[arg(long)]
        details: Option<String>
      , #[command(flatten)]
        opts: CompletionArgs
    }
  , /// Print the example templates
    Samples
  , /// List selectable models
    Models
}

#[derive(Args)]
struct CompletionArgs
{   /// gpt-4o, gpt-4o-mini or gpt-3.5-turbo
    #[arg(long, value_parser = parse_model)]
    model: Option<ChatModel>
  , /// Sampling temperature between 0.0 and 1.0
    #[arg(long, value_parser = parse_temperature)]
    temperature: Option<f32>
  , /// API key (defaults to $OPENAI_API_KEY)
    #[arg(long)]
    api_key: Option<String>
  , /// Save the output as plain text (default ai_prompt.txt)
    #[arg(long, num_args = 0..=1)]
    save: Option<Option<PathBuf>>
  , /// Only build and print the prompt
    #[arg(long)]
    prompt_only: bool
}

fn parse_model(s: &str) -> Result<ChatModel, Error>
{   s.parse()
}

fn parse_complexity(s: &str) -> Result<Complexity, Error>
{   s.parse()
}

fn parse_temperature(s: &str) -> Result<f32, Error>
{   let value: f32 = s.trim().parse()
      .map_err(|_| Error::Other(format!("not a number: {}", s)))?;
    validate_temperature(value)
}

/// Read one line for `label` unless it was given on the command line
fn field_or_ask(
  value: Option<String>
, label: &str
, hint: &str
) -> Result<String, Error>
{   if let Some(v) = value
    {   return Ok(v);
    }
    let mut stdout = std::io::stdout();
    write!(stdout, "{} ({}): ", label, hint)?;
    stdout.flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn load_config(
  path: Option<&PathBuf>
, opts: &CompletionArgs
) -> Result<EnhancerConfig, Error>
{   let mut config = match path
    {   Some(p) => EnhancerConfig::load(p)?
      , None => EnhancerConfig::default()
    };
    if let Some(key) = &opts.api_key
    {   config.completion.api_key = Some(key.clone());
    }
    config.apply_env();
    if let Some(model) = opts.model
    {   config.completion.model = model;
    }
    if let Some(t) = opts.temperature
    {   config.completion.temperature = t;
    }
    Ok(config)
}

fn save_if_requested(
  opts: &CompletionArgs
, config: &EnhancerConfig
, text: &str
) -> Result<(), Error>
{   if let Some(target) = &opts.save
    {   let path = target.clone()
          .unwrap_or_else(|| config.export_path.clone());
        let written = prompt_enhancer::export::save_text(
          Some(&path), text
        )?;
        println!("Saved to {}", written.display());
    }
    Ok(())
}

async fn run_form(
  request: PromptRequest
, opts: CompletionArgs
, config_path: Option<&PathBuf>
) -> Result<ExitCode, Error>
{   let config = load_config(config_path, &opts)?;
    let client = CompletionClient::openai(
      config.completion.api_base.clone()
    );
    let flow = PromptFlow::new(client, config.completion.clone());

    if opts.prompt_only
    {   return match flow.build_only(&request)
        {   Ok(prompt) => {
              println!("{}", prompt);
              save_if_requested(&opts, &config, prompt.text())?;
              Ok(ExitCode::SUCCESS)
            }
          , Err(e) if e.is_warning() => {
              eprintln!("Warning: {}", e);
              Ok(ExitCode::from(2))
            }
          , Err(e) => Err(e)
        };
    }

    let backend = EnhancerBackend::new(flow);
    let mut reply_rx = backend.submit(request).await?;
    let outcome = reply_rx.recv().await
      .ok_or_else(|| Error::Other("Backend dropped reply".to_string()))??;
    backend.shutdown().await?;

    match &outcome
    {   FlowOutcome::Warning(e) => {
          eprintln!("Warning: {}", e);
          Ok(ExitCode::from(2))
        }
      , FlowOutcome::Blocked(e) => {
          eprintln!("{}", e.to_display_string());
          Ok(ExitCode::FAILURE)
        }
      , FlowOutcome::Completed { prompt, result } => {
          println!("## Enhanced Prompt\n\n{}", prompt);
          println!("## Response\n\n{}", result.display_text());
          save_if_requested(&opts, &config, result.display_text())?;
          if result.is_success()
          {   Ok(ExitCode::SUCCESS)
          } else
          {   Ok(ExitCode::FAILURE)
          }
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, Error>
{   match cli.command
    {   Commands::Enhance { role, context, task, opts } => {
          let role = field_or_ask(
            role, "Role", "e.g., Data Scientist, Teacher, Marketer"
          )?;
          let context = field_or_ask(
            context, "Context", "background information"
          )?;
          let task = field_or_ask(
            task, "Task", "what needs to be done"
          )?;
          let request = PromptRequest::role_task(role, context, task);
          run_form(request, opts, cli.config.as_ref()).await
        }
      , Commands::Design {
          prompt_type, target_model, complexity, details, opts
        } => {
          let prompt_type = field_or_ask(
            prompt_type, "Prompt type", "e.g., Code review, Summarization"
          )?;
          let target_model = field_or_ask(
            target_model, "Target model", "model the prompt is for"
          )?;
          let complexity = match complexity
          {   Some(c) => c
            , None => field_or_ask(
                None, "Complexity", "Simple, Moderate, Complex, Advanced"
              )?.parse()?
          };
          let details = field_or_ask(
            details, "Details", "what the prompt should achieve"
          )?;
          let request = PromptRequest::prompt_design(
            prompt_type, target_model, complexity, details
          );
          run_form(request, opts, cli.config.as_ref()).await
        }
      , Commands::Samples => {
          for sample in prompt_enhancer::samples::example_requests()
          {   let prompt = prompt_enhancer::template::build_prompt(
                &sample.request
              );
              println!("### {}\n\n{}", sample.title, prompt);
          }
          Ok(ExitCode::SUCCESS)
        }
      , Commands::Models => {
          for model in ChatModel::ALL
          {   println!("{}", model);
          }
          Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode
{   let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or(default_level)
    ).init();
    debug!("prompt-enhancer starting");

    match run(cli).await
    {   Ok(code) => code
      , Err(e) => {
          error!("{}", e);
          eprintln!("{}", e.to_display_string());
          ExitCode::FAILURE
        }
    }
}
