//! CLI enum types and the provider flags shared by `serve` and `tag`.

use clap::{Args, ValueEnum};
use lenstag_core::{Config, ProviderKind, SchemaKind};

/// Supported inference providers.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ProviderArg {
    /// OpenAI Chat Completions (gpt-4o-mini by default)
    Openai,
    /// Google Gemini (gemini-2.0-flash by default)
    Gemini,
}

impl From<ProviderArg> for ProviderKind {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Openai => ProviderKind::Openai,
            ProviderArg::Gemini => ProviderKind::Gemini,
        }
    }
}

/// Output schemas.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SchemaArg {
    /// tags, category, 8 fashion attributes
    Basic,
    /// category, sub_category, 11 attributes, auto_tags, seo_description
    Catalog,
}

impl From<SchemaArg> for SchemaKind {
    fn from(arg: SchemaArg) -> Self {
        match arg {
            SchemaArg::Basic => SchemaKind::Basic,
            SchemaArg::Catalog => SchemaKind::Catalog,
        }
    }
}

/// Provider selection flags, applied on top of the config file.
#[derive(Args, Debug, Default)]
pub struct ProviderArgs {
    /// Inference provider
    #[arg(long, value_enum)]
    pub provider: Option<ProviderArg>,

    /// Output schema (defaults to the provider's native schema)
    #[arg(long, value_enum)]
    pub schema: Option<SchemaArg>,

    /// Model name (provider-specific)
    #[arg(long)]
    pub model: Option<String>,
}

impl ProviderArgs {
    pub fn apply(&self, config: &mut Config) -> anyhow::Result<()> {
        if let Some(provider) = self.provider {
            config.tagging.provider = provider.into();
        }
        if let Some(schema) = self.schema {
            config.tagging.schema = Some(schema.into());
        }
        if let Some(model) = &self.model {
            config.tagging.model = Some(model.clone());
        }
        config.validate()?;
        Ok(())
    }
}
