use clap::{Parser, Subcommand};
use linguaroom_core::inference::{GenerativeBackend, HfBackend, InferenceClient, MockBackend};
use linguaroom_core::pipeline::{self, Pipeline};
use linguaroom_core::repl::run_repl;
use linguaroom_core::types::{AppConfig, CorrectionReport, LanguageCode, ResponseBundle, Translation};
use std::fs;
use std::path::{Path, PathBuf};
use toml::Value;

#[derive(Debug, Parser)]
#[command(
    name = "linguaroom",
    version,
    about = "Practice languages against an LLM tutor with grammar feedback"
)]
struct Cli {
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    InitConfig {
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    Chat {
        message: String,
    },
    Correct {
        message: String,
        #[arg(long = "target-lang", default_value = "id")]
        target_lang: String,
    },
    Repl,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if let Commands::InitConfig { force } = cli.cmd {
        init_config_file(Path::new(".linguaroom.toml"), force)?;
        println!("initialized .linguaroom.toml");
        return Ok(());
    }

    let cfg = load_config()?;

    match cli.cmd {
        Commands::InitConfig { .. } => {}
        Commands::Chat { message } => {
            let pipeline = build_pipeline(&cfg, |k| std::env::var(k).ok())?;
            let bundle = pipeline.process(&message).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&bundle)?);
            } else {
                render_bundle(&bundle);
            }
        }
        Commands::Correct {
            message,
            target_lang,
        } => {
            let target = LanguageCode::from_code(&target_lang)
                .ok_or_else(|| anyhow::anyhow!("unsupported target language: {target_lang}"))?;
            let report = pipeline::correct(&message, target)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                render_report(&report);
            }
        }
        Commands::Repl => {
            let pipeline = build_pipeline(&cfg, |k| std::env::var(k).ok())?;
            run_repl(&pipeline).await?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn render_bundle(bundle: &ResponseBundle) {
    println!("tutor> {}", bundle.reply);
    if !bundle.correction.is_correct {
        println!("correction:  {}", bundle.correction.corrected);
    }
    println!("pattern:     {}", bundle.grammar_formula);
    println!("translation: {}", bundle.translation);
    println!("language:    {}", bundle.language);
}

fn render_report(report: &CorrectionReport) {
    if report.correction.is_correct {
        println!("already correct: {}", report.correction.corrected);
    } else {
        println!("corrected: {}", report.correction.corrected);
    }
    println!("pattern:   {}", report.correction.pattern);
    if let Translation::Text(text) = &report.translation {
        println!("translation: {text}");
    } else {
        println!("translation: {}", Translation::Unavailable);
    }
}

fn build_pipeline<F>(cfg: &AppConfig, env_get: F) -> anyhow::Result<Pipeline<Box<dyn GenerativeBackend>>>
where
    F: Fn(&str) -> Option<String>,
{
    let backend = build_backend(cfg, env_get)?;
    Ok(Pipeline::new(InferenceClient::new(
        backend,
        cfg.inference.max_attempts,
    )))
}

fn build_backend<F>(cfg: &AppConfig, env_get: F) -> anyhow::Result<Box<dyn GenerativeBackend>>
where
    F: Fn(&str) -> Option<String>,
{
    match cfg.backend.to_ascii_lowercase().as_str() {
        "mock" => Ok(Box::new(MockBackend)),
        "huggingface" => {
            let token = env_get(&cfg.inference.api_key_env_var)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "missing inference credential: set {}",
                        cfg.inference.api_key_env_var
                    )
                })?;
            Ok(Box::new(HfBackend::new(&cfg.inference, token)?))
        }
        other => anyhow::bail!("unknown backend: {other}; expected huggingface or mock"),
    }
}

fn load_config() -> anyhow::Result<AppConfig> {
    let local_path = PathBuf::from(".linguaroom.toml");
    let home_path = std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".linguaroom.toml"));

    let home = match &home_path {
        Some(path) => read_config_value(path)?,
        None => None,
    };
    let local = read_config_value(&local_path)?;

    resolve_config(home, local, |k| std::env::var(k).ok())
}

fn resolve_config<F>(
    home: Option<Value>,
    local: Option<Value>,
    env_get: F,
) -> anyhow::Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut merged = Value::try_from(AppConfig::default())?;
    if let Some(home_value) = home {
        merge_toml(&mut merged, home_value);
    }
    if let Some(local_value) = local {
        merge_toml(&mut merged, local_value);
    }

    let mut cfg: AppConfig = merged.try_into()?;
    apply_env_overrides(&mut cfg, env_get);
    Ok(cfg)
}

fn read_config_value(path: &Path) -> anyhow::Result<Option<Value>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path)?;
    let parsed = raw.parse::<Value>()?;
    Ok(Some(parsed))
}

fn merge_toml(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Table(base_map), Value::Table(overlay_map)) => {
            for (key, value) in overlay_map {
                if let Some(base_value) = base_map.get_mut(&key) {
                    merge_toml(base_value, value);
                } else {
                    base_map.insert(key, value);
                }
            }
        }
        (base_value, overlay_value) => {
            *base_value = overlay_value;
        }
    }
}

fn apply_env_overrides<F>(cfg: &mut AppConfig, env_get: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = env_get("LINGUAROOM_BACKEND") {
        cfg.backend = v;
    }
    if let Some(v) = env_get("LINGUAROOM_ENDPOINT") {
        cfg.inference.endpoint = v;
    }
    if let Some(v) = env_get("LINGUAROOM_MODEL") {
        cfg.inference.model = v;
    }
    if let Some(v) = env_get("LINGUAROOM_API_KEY_ENV_VAR") {
        cfg.inference.api_key_env_var = v;
    }
    if let Some(v) = env_get("LINGUAROOM_MAX_LENGTH").and_then(|v| v.parse::<u32>().ok()) {
        cfg.inference.max_length = v;
    }
    if let Some(v) = env_get("LINGUAROOM_TEMPERATURE").and_then(|v| v.parse::<f32>().ok()) {
        cfg.inference.temperature = v;
    }
    if let Some(v) = env_get("LINGUAROOM_TIMEOUT_MS").and_then(|v| v.parse::<u64>().ok()) {
        cfg.inference.timeout_ms = v;
    }
    if let Some(v) = env_get("LINGUAROOM_MAX_ATTEMPTS").and_then(|v| v.parse::<u32>().ok()) {
        cfg.inference.max_attempts = v;
    }
}

fn init_config_file(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists; re-run with --force to overwrite",
            path.display()
        );
    }
    fs::write(path, config_template())?;
    Ok(())
}

fn config_template() -> &'static str {
    r#"# linguaroom configuration
# precedence: env > local .linguaroom.toml > home ~/.linguaroom.toml > defaults

# backend options: huggingface, mock
backend = "huggingface"

[inference]
endpoint = "https://api-inference.huggingface.co/models"
model = "microsoft/DialoGPT-medium"
api_key_env_var = "HUGGINGFACE_API_KEY"
max_length = 100
temperature = 0.7
do_sample = true
timeout_ms = 10000
max_attempts = 3
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::collections::HashMap;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn config_precedence_env_local_home_defaults() {
        let home = Some(
            r#"
            [inference]
            model = "home-model"
            max_attempts = 5
            "#
            .parse::<Value>()
            .expect("home parse"),
        );

        let local = Some(
            r#"
            [inference]
            model = "local-model"
            "#
            .parse::<Value>()
            .expect("local parse"),
        );

        let env = HashMap::from([
            ("LINGUAROOM_MODEL".to_string(), "env-model".to_string()),
            ("LINGUAROOM_BACKEND".to_string(), "mock".to_string()),
        ]);

        let cfg = resolve_config(home, local, |k| env.get(k).cloned()).expect("resolve config");

        assert_eq!(cfg.inference.model, "env-model");
        assert_eq!(cfg.backend, "mock");
        assert_eq!(cfg.inference.max_attempts, 5);
        assert_eq!(cfg.inference.timeout_ms, 10_000);
    }

    #[test]
    fn init_config_requires_force_to_overwrite() {
        let base = std::env::temp_dir().join(format!(
            "linguaroom-cli-test-{}-{}",
            std::process::id(),
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("time")
                .as_nanos()
        ));
        fs::create_dir_all(&base).expect("create temp dir");
        let cfg_path = base.join(".linguaroom.toml");

        init_config_file(&cfg_path, false).expect("must create first config");
        let err = init_config_file(&cfg_path, false).expect_err("must reject overwrite");
        assert!(err.to_string().contains("--force"));

        init_config_file(&cfg_path, true).expect("force overwrite should succeed");
        let content = fs::read_to_string(&cfg_path).expect("read config");
        assert!(content.contains("[inference]"));

        fs::remove_dir_all(&base).expect("cleanup temp dir");
    }

    #[test]
    fn mock_backend_needs_no_credential() {
        let mut cfg = AppConfig::default();
        cfg.backend = "mock".to_string();
        assert!(build_backend(&cfg, |_| None).is_ok());
    }

    #[test]
    fn missing_credential_fails_at_startup() {
        let cfg = AppConfig::default();
        let err = build_backend(&cfg, |_| None).err().expect("must reject missing token");
        assert!(err.to_string().contains("HUGGINGFACE_API_KEY"));
    }

    #[test]
    fn credential_env_var_name_is_configurable() {
        let mut cfg = AppConfig::default();
        cfg.inference.api_key_env_var = "CUSTOM_TOKEN".to_string();
        let env = HashMap::from([("CUSTOM_TOKEN".to_string(), "secret".to_string())]);
        assert!(build_backend(&cfg, |k| env.get(k).cloned()).is_ok());
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.backend = "carrier-pigeon".to_string();
        let err = build_backend(&cfg, |_| None).err().expect("must reject unknown backend");
        assert!(err.to_string().contains("carrier-pigeon"));
    }

    #[test]
    fn correct_command_parses_flags() {
        let cli = Cli::try_parse_from([
            "linguaroom",
            "correct",
            "good morning",
            "--target-lang",
            "en",
            "--json",
        ])
        .expect("cli parse");

        assert!(cli.json);
        match cli.cmd {
            Commands::Correct {
                message,
                target_lang,
            } => {
                assert_eq!(message, "good morning");
                assert_eq!(target_lang, "en");
            }
            _ => panic!("expected correct command"),
        }
    }
}
