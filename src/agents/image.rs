use super::upstream_message;
use crate::llm::LLMClient;
use crate::services::ImageService;
use crate::tools::{Tool, ToolContext, IMAGE_GENERATOR};
use crate::types::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Two-stage image generation: prompt engineering, then rendering.
pub struct ImageAgent {
    llm: Arc<dyn LLMClient>,
    images: Arc<dyn ImageService>,
}

impl ImageAgent {
    pub fn new(llm: Arc<dyn LLMClient>, images: Arc<dyn ImageService>) -> Self {
        Self { llm, images }
    }

    /// Expand a short description into a detailed generation prompt.
    pub async fn engineer_prompt(&self, description: &str) -> Result<String> {
        let prompt = format!(
            "You are a helpful prompt-engineering assistant. A user wants to generate an image \
             based on this description: '{}'. Generate a highly detailed, vivid, and specific \
             prompt for the DALL-E 3 image generation model.",
            description
        );
        Ok(self.llm.generate(&prompt).await?.trim().to_string())
    }

    pub async fn generate(&self, description: &str) -> Result<String> {
        let engineered = self.engineer_prompt(description).await?;
        tracing::info!(prompt = %engineered, "Engineered image prompt");

        let url = self.images.generate(&engineered).await?;
        Ok(format!("![Generated image: {}]({})", description, url))
    }
}

#[async_trait]
impl Tool for ImageAgent {
    fn name(&self) -> &str {
        IMAGE_GENERATOR
    }

    fn description(&self) -> &str {
        "Use this tool ONLY when a user explicitly asks to create, draw, generate, \
         show an image, picture or drawing."
    }

    async fn invoke(&self, argument: &str, _context: &ToolContext<'_>) -> String {
        match self.generate(argument).await {
            Ok(markdown) => markdown,
            Err(e) => {
                tracing::warn!(error = %e, "Image generation failed");
                format!(
                    "Error generating image: {}. The prompt might have been rejected by the safety system.",
                    upstream_message(e)
                )
            }
        }
    }
}
