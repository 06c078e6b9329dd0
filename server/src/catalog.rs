use serde::{Deserialize, Serialize};
use trivia_shared::{Category, Difficulty, Question};
use uuid::Uuid;

use crate::config::{CatalogConfig, CatalogSourceType};
use crate::error::CatalogError;

/// A catalog item before it has been given an identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub question: String,
    pub answers: Vec<String>,
    pub correct_answer: usize,
    pub icon: String,
    pub explanation: String,
    pub category: Category,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl CatalogEntry {
    fn into_question(self) -> Question {
        Question {
            id: Uuid::new_v4(),
            question: self.question,
            answers: self.answers,
            correct_answer: self.correct_answer,
            icon: self.icon,
            explanation: self.explanation,
            category: self.category,
            difficulty: self.difficulty,
            image_url: self.image_url,
        }
    }
}

/// Assigns ids and validates every entry. A single bad entry rejects the whole catalog.
pub fn build_catalog(entries: Vec<CatalogEntry>) -> Result<Vec<Question>, CatalogError> {
    if entries.is_empty() {
        return Err(CatalogError::Empty);
    }
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let question = entry.into_question();
            question
                .validate()
                .map_err(|source| CatalogError::InvalidQuestion { index, source })?;
            Ok(question)
        })
        .collect()
}

pub struct CatalogParser;

impl CatalogParser {
    #[tracing::instrument(skip(content), fields(content.length = content.len()))]
    pub fn parse(content: &str) -> Result<Vec<Question>, CatalogError> {
        tracing::debug!("Parsing JSON catalog");
        let entries: Vec<CatalogEntry> = serde_json::from_str(content)
            .map_err(|e| CatalogError::Parse(format!("Failed to parse JSON: {}", e)))?;
        build_catalog(entries)
    }
}

/// Produces the catalog the store is seeded with.
#[tracing::instrument(skip(config), fields(
    catalog.source_type = ?config.source_type,
    catalog.file_path = ?config.file_path,
    catalog.http_url = ?config.http_url
))]
pub async fn load_catalog(config: &CatalogConfig) -> Result<Vec<Question>, CatalogError> {
    let questions = match config.source_type {
        CatalogSourceType::Builtin => build_catalog(builtin_entries())?,
        CatalogSourceType::File | CatalogSourceType::Http => {
            let raw_content = load_raw_content(config).await?;
            CatalogParser::parse(&raw_content)?
        }
    };

    tracing::info!(question.count = questions.len(), "Loaded question catalog");
    Ok(questions)
}

async fn load_raw_content(config: &CatalogConfig) -> Result<String, CatalogError> {
    match config.source_type {
        CatalogSourceType::File => {
            let file_path = config.file_path.as_ref().ok_or_else(|| {
                CatalogError::Config("File path required for file source".to_string())
            })?;
            tracing::debug!(file.path = %file_path, "Loading catalog from file");
            tokio::fs::read_to_string(file_path)
                .await
                .map_err(|e| CatalogError::FileRead {
                    path: file_path.clone(),
                    source: e,
                })
        }
        CatalogSourceType::Http => {
            let url = config.http_url.as_ref().ok_or_else(|| {
                CatalogError::Config("HTTP URL required for http source".to_string())
            })?;
            tracing::debug!(http.url = %url, "Fetching catalog from URL");
            let response = reqwest::get(url)
                .await
                .and_then(|response| response.error_for_status())
                .map_err(|e| CatalogError::HttpFetch {
                    url: url.clone(),
                    source: e,
                })?;

            response.text().await.map_err(|e| CatalogError::HttpFetch {
                url: url.clone(),
                source: e,
            })
        }
        CatalogSourceType::Builtin => Err(CatalogError::Config(
            "Builtin catalog has no raw content".to_string(),
        )),
    }
}

fn entry(
    question: &str,
    answers: [&str; 4],
    correct_answer: usize,
    icon: &str,
    explanation: &str,
    category: Category,
    difficulty: Difficulty,
) -> CatalogEntry {
    CatalogEntry {
        question: question.to_string(),
        answers: answers.iter().map(|a| a.to_string()).collect(),
        correct_answer,
        icon: icon.to_string(),
        explanation: explanation.to_string(),
        category,
        difficulty,
        image_url: None,
    }
}

/// The curated Discover Colombia question set.
pub fn builtin_entries() -> Vec<CatalogEntry> {
    use Category::*;
    use Difficulty::*;

    vec![
        entry(
            "What is the capital city of Colombia?",
            ["Medellín", "Cali", "Bogotá", "Cartagena"],
            2,
            "🏛️",
            "Bogotá is the capital and largest city of Colombia, located in the center of the country.",
            Geography,
            Beginner,
        ),
        entry(
            "Which country does NOT share a border with Colombia?",
            ["Ecuador", "Peru", "Venezuela", "Chile"],
            3,
            "🗺️",
            "Chile is located on the western coast of South America and does not border Colombia.",
            Geography,
            Intermediate,
        ),
        entry(
            "Which city is known as the 'City of Eternal Spring'?",
            ["Barranquilla", "Medellín", "Bucaramanga", "Pereira"],
            1,
            "🌸",
            "Medellín is called the 'City of Eternal Spring' due to its pleasant year-round climate.",
            Geography,
            Beginner,
        ),
        entry(
            "What is Colombia's most famous export?",
            ["Emeralds", "Coffee", "Oil", "Flowers"],
            1,
            "☕",
            "Colombia is world-renowned for its high-quality coffee, particularly Arabica beans.",
            Economy,
            Beginner,
        ),
        entry(
            "Which Colombian city is a major Caribbean port?",
            ["Medellín", "Bogotá", "Cartagena", "Cali"],
            2,
            "⚓",
            "Cartagena is Colombia's most important Caribbean port and a popular tourist destination.",
            Geography,
            Beginner,
        ),
        entry(
            "What mountain range runs through Colombia?",
            ["Rockies", "Andes", "Himalayas", "Alps"],
            1,
            "⛰️",
            "The Andes mountain range extends through Colombia, forming three main cordilleras.",
            Geography,
            Intermediate,
        ),
        entry(
            "Which dance originated in Colombia?",
            ["Tango", "Salsa", "Cumbia", "Bachata"],
            2,
            "💃",
            "Cumbia is a traditional Colombian dance and music style that originated on the Caribbean coast.",
            Culture,
            Beginner,
        ),
        entry(
            "What is the currency of Colombia?",
            ["Dollar", "Peso", "Sol", "Bolivar"],
            1,
            "💰",
            "The Colombian peso (COP) is the official currency of Colombia.",
            Economy,
            Beginner,
        ),
        entry(
            "Which Colombian author won the Nobel Prize in Literature?",
            [
                "Mario Vargas Llosa",
                "Gabriel García Márquez",
                "Jorge Luis Borges",
                "Pablo Neruda",
            ],
            1,
            "📚",
            "Gabriel García Márquez won the Nobel Prize in Literature in 1982 for his magical realism.",
            Culture,
            Advanced,
        ),
        entry(
            "What percentage of the world's emeralds come from Colombia?",
            ["50%", "60%", "70%", "80%"],
            2,
            "💎",
            "Colombia produces approximately 70% of the world's emeralds, particularly from Boyacá.",
            Economy,
            Intermediate,
        ),
        entry(
            "Which Colombian festival is famous worldwide?",
            [
                "Carnival of Barranquilla",
                "Day of the Dead",
                "Inti Raymi",
                "La Tomatina",
            ],
            0,
            "🎭",
            "The Carnival of Barranquilla is one of the largest carnival celebrations in the world.",
            Culture,
            Intermediate,
        ),
        entry(
            "What is the official language of Colombia?",
            ["Portuguese", "English", "Spanish", "French"],
            2,
            "🗣️",
            "Spanish is the official language of Colombia, spoken by the vast majority of the population.",
            Culture,
            Beginner,
        ),
        entry(
            "Which Colombian region is known for coffee production?",
            ["Amazon", "Coffee Triangle", "Llanos", "Caribbean Coast"],
            1,
            "🌿",
            "The Coffee Triangle (Eje Cafetero) is the heart of Colombia's coffee production.",
            Geography,
            Intermediate,
        ),
        entry(
            "What is Colombia's second largest city?",
            ["Cali", "Medellín", "Barranquilla", "Cartagena"],
            1,
            "🏙️",
            "Medellín is Colombia's second largest city and an important industrial center.",
            Geography,
            Beginner,
        ),
        entry(
            "Which ocean borders Colombia to the west?",
            ["Atlantic", "Indian", "Pacific", "Arctic"],
            2,
            "🌊",
            "The Pacific Ocean borders Colombia's western coast, providing access to Asian markets.",
            Geography,
            Beginner,
        ),
        entry(
            "What is the name of Colombia's national flower?",
            ["Rose", "Orchid", "Carnation", "Lily"],
            1,
            "🌺",
            "The Cattleya trianae orchid is Colombia's national flower, named after Colombian botanist José Jerónimo Triana.",
            Culture,
            Intermediate,
        ),
        entry(
            "Which Colombian city hosted the 2011 FIFA U-20 World Cup final?",
            ["Bogotá", "Medellín", "Cali", "Barranquilla"],
            0,
            "⚽",
            "Bogotá's El Campín stadium hosted the final match of the 2011 FIFA U-20 World Cup.",
            Sports,
            Advanced,
        ),
        entry(
            "What is the highest peak in Colombia?",
            [
                "Pico Cristóbal Colón",
                "Nevado del Ruiz",
                "Pico Bolívar",
                "Cerro Pintado",
            ],
            0,
            "🏔️",
            "Pico Cristóbal Colón in the Sierra Nevada de Santa Marta is Colombia's highest peak at 5,700 meters.",
            Geography,
            Advanced,
        ),
    ]
}
