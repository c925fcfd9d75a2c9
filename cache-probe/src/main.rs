use cache_facade::SimpleCache;
use serde_json::{Value, json};
use shared::Ttl;
use shared::config::Config;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const PROBE_TTL: Ttl = Ttl(30);

fn check(step: &str, ok: bool) -> Result<(), Box<dyn std::error::Error>> {
    if ok {
        info!("  {step}: ok");
        Ok(())
    } else {
        error!("  {step}: unexpected result");
        Err(format!("probe step '{step}' returned an unexpected result").into())
    }
}

/// Round trip on throwaway keys. Never flushes the cache.
fn run_probe(cache: &impl SimpleCache) -> Result<(), Box<dyn std::error::Error>> {
    let key = json!(format!("cache-probe:{}", std::process::id()));
    let other = json!(format!("cache-probe:{}:other", std::process::id()));
    let missing = json!(format!("cache-probe:{}:missing", std::process::id()));
    let value = json!("alive");

    check("set", cache.set(&key, &value, Some(PROBE_TTL))?)?;
    check("get", cache.get(&key, Value::Null)? == value)?;
    check("has", cache.has(&key)?)?;

    cache.set_multiple(&[(other.clone(), json!(""))], Some(PROBE_TTL))?;
    let found = cache.get_multiple(&[key.clone(), other.clone(), missing.clone()], Value::Null)?;
    check(
        "get_multiple",
        found.len() == 3
            && found.values().filter(|v| v.is_null()).count() == 1
            && found.values().any(|v| v == &json!("")),
    )?;

    check("delete", cache.delete(&key)?)?;
    check("delete_multiple", cache.delete_multiple(&[other])?)?;
    check("has after delete", !cache.has(&key)?)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load environment variables from .env file (if exists)
    match dotenvy::dotenv() {
        Ok(_) => info!("Loaded environment variables from .env file"),
        Err(_) => info!("No .env file found, using system environment variables"),
    }

    let config = Config::from_env();
    info!(
        "Probing {} cache at {}",
        config.backend.as_str(),
        config.endpoint()
    );

    let cache = storage_engine::client_from_config(&config);

    match run_probe(&cache) {
        Ok(()) => {
            info!("Cache probe passed");
            Ok(())
        }
        Err(e) => {
            error!("Cache probe failed: {e}");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cache_facade::CacheClient;
    use storage_engine::MokaCache;

    #[test]
    fn test_probe_passes_against_memory_backend() {
        let cache = CacheClient::with_backend(MokaCache::new_unbounded(None));
        run_probe(&cache).unwrap();
    }
}
