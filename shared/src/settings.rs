use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseSettingError {
    #[error("Unknown difficulty: {0}")]
    Difficulty(String),
    #[error("Unknown category: {0}")]
    Category(String),
    #[error("Unknown game mode: {0}")]
    GameMode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn all() -> [Self; 3] {
        [
            Difficulty::Beginner,
            Difficulty::Intermediate,
            Difficulty::Advanced,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            _ => Err(ParseSettingError::Difficulty(s.to_string())),
        }
    }
}

/// Topic tags used by the catalog. `all` is a setup-screen choice, not a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Geography,
    Culture,
    Economy,
    Sports,
}

impl Category {
    pub fn all() -> [Self; 4] {
        [
            Category::Geography,
            Category::Culture,
            Category::Economy,
            Category::Sports,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Geography => "Geography",
            Category::Culture => "Culture",
            Category::Economy => "Economy",
            Category::Sports => "Sports",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::all()
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseSettingError::Category(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Quick,
    Comprehensive,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Quick => "quick",
            GameMode::Comprehensive => "comprehensive",
        }
    }

    /// How many questions a session in this mode may present, `None` meaning all of them.
    pub fn question_limit(&self, quick_limit: usize) -> Option<usize> {
        match self {
            GameMode::Quick => Some(quick_limit),
            GameMode::Comprehensive => None,
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameMode {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quick" => Ok(GameMode::Quick),
            "comprehensive" => Ok(GameMode::Comprehensive),
            _ => Err(ParseSettingError::GameMode(s.to_string())),
        }
    }
}

/// Choices made on the setup screen for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    pub difficulty: Difficulty,
    pub game_mode: GameMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl GameSettings {
    pub fn new(difficulty: Difficulty, game_mode: GameMode, category: Option<Category>) -> Self {
        Self {
            difficulty,
            game_mode,
            category,
        }
    }

    /// Query parameters for `GET /api/quiz/questions`.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, &'static str)> {
        let mut pairs = vec![("difficulty", self.difficulty.as_str())];
        if let Some(category) = self.category {
            pairs.push(("category", category.as_str()));
        }
        pairs.push(("mode", self.game_mode.as_str()));
        pairs
    }
}

impl fmt::Display for GameSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let questions = match self.game_mode {
            GameMode::Quick => "Quick quiz",
            GameMode::Comprehensive => "Full quiz",
        };
        let topic = self.category.map(|c| c.as_str()).unwrap_or("All topics");
        write!(f, "{} • {} • {}", self.difficulty, questions, topic)
    }
}
