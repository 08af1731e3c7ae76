use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    config::Config,
    error::{AppError, Result},
    models::{AppendHistoryRequest, ChatMessage, FoodItem},
};

const CHAT_SYSTEM_INSTRUCTION: &str = "You are a specialized AI assistant for a fitness and nutrition platform. Your primary role is to provide real, accurate, and helpful answers strictly related to fitness, workouts, nutrition, diet, wellness, and healthy lifestyle choices. If a user asks a question that is completely unrelated to these topics, you must politely decline to answer, stating that your expertise is restricted to fitness and nutrition.

IMPORTANT FORMATTING RULES:
1. Be CONCISE and DIRECT. Do not write long paragraphs.
2. Structure your response using Markdown.
3. Use bullet points lists (•) for multiple items, tips, or steps.
4. Bold **key terms** for readability.
5. Limit responses to 3-4 short sections maximum. Never output a wall of text.
6. Use emojis sparingly but effectively to make the message engaging.";

/// Client for the Gemini generateContent REST endpoint. All model-backed
/// features go through here so the missing-key case is handled in one place.
#[derive(Debug, Clone)]
pub struct AssistantService {
    client: Client,
    api_key: Option<String>,
    api_base: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

impl AssistantService {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            api_key: config.gemini_api_key.clone(),
            api_base: config.gemini_api_base.clone(),
            model: config.gemini_model.clone(),
        }
    }

    async fn generate(&self, prompt: &str, system_instruction: Option<&str>) -> Result<Option<String>> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            AppError::AssistantUnavailable("GEMINI_API_KEY is not configured".to_string())
        })?;

        let request = GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            system_instruction: system_instruction.map(|text| SystemInstruction {
                parts: vec![Part {
                    text: text.to_string(),
                }],
            }),
        };

        let url = format!("{}/models/{}:generateContent", self.api_base, self.model);
        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini API error: {}", error_text);
            return Err(AppError::Internal(format!(
                "Gemini API error: {}",
                error_text
            )));
        }

        let body: GenerateResponse = response.json().await?;
        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .map(|part| part.text);

        Ok(text)
    }

    pub async fn chat_reply(&self, message: &str) -> Result<String> {
        let reply = self.generate(message, Some(CHAT_SYSTEM_INSTRUCTION)).await?;
        Ok(reply.unwrap_or_else(|| {
            "I'm sorry, I couldn't generate a response at this time.".to_string()
        }))
    }

    /// Asks the model for nutrition facts and parses its JSON answer. The
    /// model is told not to fence the output, but it sometimes does anyway,
    /// so fences are stripped before parsing.
    pub async fn food_lookup(&self, query: &str) -> Result<FoodItem> {
        let prompt = format!(
            r#"You are an expert nutritionist database.
Provide the nutritional information for the following food item or meal: "{query}".

Return the output STRICTLY in the following JSON format without any markdown formatting or extra text:
{{
    "name": "Proper name of the food",
    "serving": "Standard serving size (e.g., '1 cup', '100g', '1 medium')",
    "calories": 0,
    "protein": 0.0,
    "carbs": 0.0,
    "fat": 0.0,
    "fiber": 0.0
}}

If the query is too vague, make a best guess for a standard serving.
Make sure your numbers are realistic.
DO NOT wrap the response in ```json ```. Start directly with the {{ and end with the }}."#
        );

        let raw = self.generate(&prompt, None).await?.unwrap_or_default();
        let cleaned = strip_code_fences(&raw);

        let parsed: serde_json::Value = serde_json::from_str(cleaned).map_err(|_| {
            tracing::error!("Failed to parse nutrition lookup response: {}", cleaned);
            AppError::Assistant("AI failed to understand the food item.".to_string())
        })?;

        let item: FoodItem = serde_json::from_value(parsed)
            .map_err(|_| AppError::Assistant("Invalid response from AI.".to_string()))?;
        if item.name.is_empty() {
            return Err(AppError::Assistant("Invalid response from AI.".to_string()));
        }

        Ok(item)
    }

    /// Weekly nutrition review written by the model from the user's targets
    /// and their last seven daily summaries.
    pub async fn nutrition_insight(&self, db: &PgPool, user_id: Uuid) -> Result<String> {
        let profile = sqlx::query_as::<_, InsightProfile>(
            "SELECT weight_kg, height_cm, age, fitness_goal::text AS fitness_goal,
                    dietary_preference, daily_calorie_target, daily_protein_target,
                    daily_carb_target, daily_fat_target, daily_water_goal_ml
             FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?;

        let profile = match profile {
            Some(profile) if profile.daily_calorie_target.is_some() => profile,
            _ => {
                return Err(AppError::BadRequest(
                    "Please complete your profile to receive insights.".to_string(),
                ));
            }
        };

        let recent = sqlx::query_as::<_, DailyLine>(
            "SELECT date, total_calories, total_protein_g, total_carbs_g, total_fat_g, total_water_ml
             FROM daily_nutrition_summary
             WHERE user_id = $1 AND date >= CURRENT_DATE - 7
             ORDER BY date ASC",
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;

        if recent.is_empty() {
            return Ok("Welcome to the Nutrition Dashboard! Start logging your meals and water intake to receive personalized, AI-driven feedback and insights on your progress.".to_string());
        }

        let log_lines: Vec<String> = recent
            .iter()
            .map(|day| {
                format!(
                    "- {}: {} kcal (P: {}g, C: {}g, F: {}g), Water: {}ml",
                    day.date,
                    day.total_calories,
                    day.total_protein_g,
                    day.total_carbs_g,
                    day.total_fat_g,
                    day.total_water_ml
                )
            })
            .collect();

        let data_context = format!(
            "User Profile:\n\
             - Goal: {}, Dietary Preference: {}\n\
             - Weight: {}kg, Height: {}cm, Age: {}\n\
             - Targets -> Calories: {}kcal, Protein: {}g, Carbs: {}g, Fat: {}g, Water: {}ml\n\
             \n\
             Last 7 Days Nutrition Log:\n\
             {}",
            text_or_none(profile.fitness_goal),
            text_or_none(profile.dietary_preference),
            text_or_none(profile.weight_kg),
            text_or_none(profile.height_cm),
            text_or_none(profile.age),
            text_or_none(profile.daily_calorie_target),
            text_or_none(profile.daily_protein_target),
            text_or_none(profile.daily_carb_target),
            text_or_none(profile.daily_fat_target),
            text_or_none(profile.daily_water_goal_ml),
            log_lines.join("\n")
        );

        let prompt = format!(
            "You are a professional, motivating fitness and nutrition AI coach.\n\
             Your role is strictly limited to health, fitness, and nutrition. You MUST NOT answer out-of-domain questions.\n\
             \n\
             Based on the following data, write a tailored, structured, and insightful summary of the user's nutrition over the past week.\n\
             Highlight what they did right, what they can improve (e.g., hitting protein goals, drinking more water, or staying within the calorie limit), and give 2-3 highly actionable tips.\n\
             \n\
             Make sure to use a good format with markdown (bullet points, bold text). Keep it encouraging but objective.\n\
             \n\
             Data:\n\
             {data_context}"
        );

        let insight = self.generate(&prompt, None).await?;
        Ok(insight.unwrap_or_default())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct InsightProfile {
    weight_kg: Option<f64>,
    height_cm: Option<f64>,
    age: Option<i32>,
    fitness_goal: Option<String>,
    dietary_preference: Option<String>,
    daily_calorie_target: Option<i32>,
    daily_protein_target: Option<i32>,
    daily_carb_target: Option<i32>,
    daily_fat_target: Option<i32>,
    daily_water_goal_ml: Option<i32>,
}

#[derive(Debug, sqlx::FromRow)]
struct DailyLine {
    date: NaiveDate,
    total_calories: i32,
    total_protein_g: f64,
    total_carbs_g: f64,
    total_fat_g: f64,
    total_water_ml: i32,
}

fn text_or_none<T: std::fmt::Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "None".to_string())
}

fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    }
    if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

pub async fn history(db: &PgPool, user_id: Uuid) -> Result<Vec<ChatMessage>> {
    let messages = sqlx::query_as::<_, ChatMessage>(
        "SELECT * FROM chat_history WHERE user_id = $1 ORDER BY timestamp ASC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(messages)
}

pub async fn append_history(
    db: &PgPool,
    user_id: Uuid,
    request: &AppendHistoryRequest,
) -> Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO chat_history (id, user_id, role, content) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(user_id)
        .bind(request.role)
        .bind(&request.content)
        .execute(db)
        .await?;

    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fences() {
        let raw = "```json\n{\"name\": \"Apple\", \"calories\": 95}\n```";
        assert_eq!(strip_code_fences(raw), "{\"name\": \"Apple\", \"calories\": 95}");
    }

    #[test]
    fn strips_bare_fences() {
        let raw = "```\n{\"name\": \"Apple\"}\n```";
        assert_eq!(strip_code_fences(raw), "{\"name\": \"Apple\"}");
    }

    #[test]
    fn leaves_unfenced_output_alone() {
        let raw = "  {\"name\": \"Apple\"}  ";
        assert_eq!(strip_code_fences(raw), "{\"name\": \"Apple\"}");
    }

    #[test]
    fn handles_fence_with_no_closing() {
        let raw = "```json\n{\"name\": \"Apple\"}";
        assert_eq!(strip_code_fences(raw), "{\"name\": \"Apple\"}");
    }

    #[test]
    fn food_item_requires_name_and_calories() {
        let missing_calories: std::result::Result<FoodItem, _> =
            serde_json::from_str("{\"name\": \"Apple\"}");
        assert!(missing_calories.is_err());

        let full: FoodItem =
            serde_json::from_str("{\"name\": \"Apple\", \"calories\": 95, \"protein\": 0.5}")
                .expect("valid item");
        assert_eq!(full.name, "Apple");
        assert_eq!(full.fiber, 0.0);
    }
}
