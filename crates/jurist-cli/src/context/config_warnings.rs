use jurist_config::JuristConfig;

/// Emit warnings for likely mistyped env var keys that silently fell back to defaults.
pub fn warn_unconfigured(config: &JuristConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &JuristConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();

    let mut warnings = Vec::new();

    if !config.supabase.is_configured() && has_env_prefix(&env_keys, "JURIST_SUPABASE") {
        warnings.push(
            "Supabase config appears default while JURIST_SUPABASE* env vars exist. Use double underscores (example: JURIST_SUPABASE__ANON_KEY)."
                .to_string(),
        );
    }

    if has_single_underscore_key(&env_keys, "JURIST_SESSION") {
        warnings.push(
            "JURIST_SESSION_* env vars are ignored. Use double underscores (example: JURIST_SESSION__PERSIST_SESSION)."
                .to_string(),
        );
    }

    warnings
}

fn has_env_prefix(keys: &[String], prefix: &str) -> bool {
    keys.iter().any(|key| key.starts_with(prefix))
}

fn has_single_underscore_key(keys: &[String], prefix: &str) -> bool {
    keys.iter().any(|key| {
        key.strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('_') && !rest.starts_with("__"))
    })
}
