use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::env;

use crate::models::{GameRules, WordCheck};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub game: GameConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Static files served for every path nothing else matches
    pub frontend_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    pub dictionary_path: String,
    pub word_check: WordCheck,
    pub failed_challenge_loses_turn: bool,
    pub successful_challenge_loses_turn: bool,
    pub tile_seed: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build the config from any variable source
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server = ServerConfig {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: var("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .context("PORT must be a number")?,
            frontend_dir: var("FRONTEND_DIR").unwrap_or_else(|| "./build".to_string()),
        };

        let word_check = match var("WORD_CHECK") {
            Some(raw) => WordCheck::parse(&raw)
                .ok_or_else(|| anyhow!("WORD_CHECK must be 'submit' or 'challenge', got '{}'", raw))?,
            None => WordCheck::default(),
        };

        let game = GameConfig {
            dictionary_path: var("DICTIONARY_PATH")
                .unwrap_or_else(|| "./dictionary.txt".to_string()),
            word_check,
            failed_challenge_loses_turn: var("FAILED_CHALLENGE_LOSES_TURN")
                .unwrap_or_else(|| "true".to_string())
                .parse()
                .context("FAILED_CHALLENGE_LOSES_TURN must be true or false")?,
            successful_challenge_loses_turn: var("SUCCESSFUL_CHALLENGE_LOSES_TURN")
                .unwrap_or_else(|| "false".to_string())
                .parse()
                .context("SUCCESSFUL_CHALLENGE_LOSES_TURN must be true or false")?,
            tile_seed: var("TILE_SEED")
                .map(|raw| raw.parse())
                .transpose()
                .context("TILE_SEED must be a number")?,
        };

        Ok(Config { server, game })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Rules every room on this server plays by
    pub fn rules(&self) -> GameRules {
        GameRules {
            word_check: self.game.word_check,
            failed_challenge_loses_turn: self.game.failed_challenge_loses_turn,
            successful_challenge_loses_turn: self.game.successful_challenge_loses_turn,
            tile_seed: self.game.tile_seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(vars(&[])).unwrap();
        assert_eq!(config.server_addr(), "0.0.0.0:3000");
        assert_eq!(config.server.frontend_dir, "./build");
        assert_eq!(config.rules(), GameRules::default());
    }

    #[test]
    fn test_rules_from_vars() {
        let config = Config::from_vars(vars(&[
            ("WORD_CHECK", "challenge"),
            ("FAILED_CHALLENGE_LOSES_TURN", "false"),
            ("SUCCESSFUL_CHALLENGE_LOSES_TURN", "true"),
            ("TILE_SEED", "42"),
        ]))
        .unwrap();
        let rules = config.rules();
        assert_eq!(rules.word_check, WordCheck::Challenge);
        assert!(!rules.failed_challenge_loses_turn);
        assert!(rules.successful_challenge_loses_turn);
        assert_eq!(rules.tile_seed, Some(42));
    }

    #[test]
    fn test_bad_values_are_errors() {
        assert!(Config::from_vars(vars(&[("PORT", "http")])).is_err());
        assert!(Config::from_vars(vars(&[("WORD_CHECK", "never")])).is_err());
        assert!(Config::from_vars(vars(&[("TILE_SEED", "-1")])).is_err());
    }
}
