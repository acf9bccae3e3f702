use std::sync::Arc;

use tracing::{info, warn};

use super::classifier::IntentClassifier;
use crate::{
    config::{Config, ModelRoster, ModelTier},
    core::{Agent, Task},
    error::Result,
    schemas::{Guardrail, GuardrailVerdict},
    services::{
        prompts::{self, Persona},
        Executor, OpenAIClient,
    },
    tools::{Tool, WebSearchTool},
    types::{ChatMessage, Intent, SuggestRequest, TripContext},
};

/// Routes trip requests to the prompt, model tier, tools and guardrail for
/// their intent, and returns the model's final text unchanged.
#[derive(Debug, Clone)]
pub struct TripPlanner {
    executor: Executor,
    classifier: IntentClassifier,
    search: Arc<dyn Tool>,
}

impl TripPlanner {
    pub fn new(executor: Executor, search: WebSearchTool) -> Self {
        Self {
            classifier: IntentClassifier::new(executor.clone()),
            executor,
            search: Arc::new(search),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = OpenAIClient::new(config.api_key.clone(), config.request_timeout)?
            .with_base_url(config.llm_base_url.clone());
        let executor = Executor::new(Arc::new(client), config.models.clone())
            .with_timeout(config.request_timeout);
        let search = WebSearchTool::new(config.serper_api_key.clone())
            .with_base_url(config.serper_base_url.clone());

        Ok(Self::new(executor, search))
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    pub fn models(&self) -> &ModelRoster {
        self.executor.models()
    }

    /// Entry point for one HTTP request.
    pub async fn handle(&self, request: &SuggestRequest) -> Result<String> {
        if request.is_full_plan() {
            self.plan_itinerary(&request.trip_context, &request.chat_history, &request.scope)
                .await
        } else {
            self.suggest(&request.query, &request.trip_context, &request.chat_history)
                .await
        }
    }

    /// Classify `query` and run the matching route.
    ///
    /// A request to add earlier suggestions ("add them", "add to the
    /// itinerary") skips classification when there is chat history to read
    /// them from.
    pub async fn suggest(
        &self,
        query: &str,
        ctx: &TripContext,
        history: &[ChatMessage],
    ) -> Result<String> {
        if !history.is_empty() && prompts::wants_previous_options(query) {
            info!(target: "wego::routing", "adding previous suggestions as options");
            return self.add_previous_options(query, ctx, history).await;
        }

        let intent = self.classifier.classify(query).await;
        info!(target: "wego::routing", %intent, "routing request");
        self.dispatch(intent, query, ctx, history).await
    }

    pub async fn dispatch(
        &self,
        intent: Intent,
        query: &str,
        ctx: &TripContext,
        history: &[ChatMessage],
    ) -> Result<String> {
        if matches!(intent, Intent::Plan | Intent::Suggest) {
            if let Some(reply) = out_of_range_day(query, ctx) {
                info!(target: "wego::routing", %intent, "requested day is outside the trip");
                return Ok(reply);
            }
        }

        match intent {
            Intent::Remove => {
                let agent = persona_agent(&prompts::MODIFIER, ModelTier::Fast);
                let task = Task::new(
                    prompts::remove_prompt(query, ctx),
                    "JSON block with action: remove_items.",
                )
                .with_guardrail(Guardrail::remove_items());
                self.run(&agent, &task).await
            }
            Intent::Modify => {
                let agent = persona_agent(&prompts::MODIFIER, ModelTier::Fast);
                let task = Task::new(
                    prompts::modify_prompt(query, ctx),
                    "JSON block with action: update_items.",
                )
                .with_guardrail(Guardrail::update_items());
                self.run(&agent, &task).await
            }
            Intent::Suggest => {
                let agent = persona_agent(&prompts::LOCAL_EXPERT, ModelTier::Fast)
                    .with_shared_tool(Arc::clone(&self.search));
                let task = Task::new(
                    prompts::suggest_prompt(query, ctx, history),
                    "You MUST output a JSON block with action: smart_schedule. This is REQUIRED, not optional.",
                )
                .with_guardrail(Guardrail::smart_schedule());
                self.run(&agent, &task).await
            }
            Intent::Plan => {
                let themes = prompts::detect_themes(query);
                let agent = persona_agent(&prompts::CREATIVE_PLANNER, ModelTier::Accurate)
                    .with_goal(prompts::themed_goal(&themes));
                let task = Task::new(
                    prompts::plan_prompt(query, ctx, &themes, prompts::target_day(query)),
                    "ONLY a JSON block with action: add_items containing themed activities.",
                )
                .with_guardrail(Guardrail::add_items());
                self.run(&agent, &task).await
            }
            Intent::General => self.research_and_plan(query, ctx, history).await,
        }
    }

    /// Turn the latest suggestions in the chat into votable `add_items` options.
    pub async fn add_previous_options(
        &self,
        query: &str,
        ctx: &TripContext,
        history: &[ChatMessage],
    ) -> Result<String> {
        let agent = persona_agent(&prompts::ITINERARY_PLANNER, ModelTier::Accurate);
        let task = Task::new(
            prompts::add_options_prompt(query, ctx, history),
            "A JSON object with action add_items, isOptions true, and items sharing the same day and duration.",
        )
        .with_guardrail(Guardrail::add_items());
        self.run(&agent, &task).await
    }

    /// Free-text day-by-day plan for `scope`. Not guardrailed.
    pub async fn plan_itinerary(
        &self,
        ctx: &TripContext,
        history: &[ChatMessage],
        scope: &str,
    ) -> Result<String> {
        info!(target: "wego::routing", scope, "full plan requested");
        let agent = persona_agent(&prompts::ITINERARY_PLANNER, ModelTier::Accurate);
        let task = Task::new(
            prompts::full_plan_prompt(ctx, history, scope),
            "A detailed day-by-day itinerary with times, activities, locations, and travel time estimates.",
        );
        self.run(&agent, &task).await
    }

    /// Research, then preference analysis, then a guarded planning step that
    /// sees both earlier outputs.
    async fn research_and_plan(
        &self,
        query: &str,
        ctx: &TripContext,
        history: &[ChatMessage],
    ) -> Result<String> {
        let researcher = persona_agent(&prompts::RESEARCHER, ModelTier::Accurate)
            .with_shared_tool(Arc::clone(&self.search));
        let research = self
            .executor
            .execute(
                &researcher,
                &Task::new(
                    prompts::research_prompt(query, ctx),
                    "A list of 5-10 relevant options with name, description, location, and practical info.",
                ),
            )
            .await?;

        let analyst = persona_agent(&prompts::PREFERENCE_ANALYST, ModelTier::Accurate);
        let preferences = self
            .executor
            .execute(
                &analyst,
                &Task::new(
                    prompts::preference_prompt(ctx, history),
                    "A summary of group preferences, optionally followed by a JSON block with action: update_preferences.",
                ),
            )
            .await?;

        let preference_update = match Guardrail::update_preferences().check(&preferences.raw) {
            GuardrailVerdict::Accepted(payload) => Some(payload),
            GuardrailVerdict::Rejected(_) => None,
        };

        let planner = persona_agent(&prompts::ITINERARY_PLANNER, ModelTier::Accurate);
        let task = Task::new(
            prompts::planning_prompt(query, ctx),
            "A JSON block with action: add_items. NO conversational text.",
        )
        .with_context("Research findings", &research.raw)
        .with_context("Group preferences", &preferences.raw)
        .with_guardrail(Guardrail::add_items());

        let mut result = self.run(&planner, &task).await?;

        if let Some(payload) = preference_update {
            let block = serde_json::to_string_pretty(&payload)?;
            result.push_str("\n\n```json\n");
            result.push_str(&block);
            result.push_str("\n```");
        }

        Ok(result)
    }

    async fn run(&self, agent: &Agent, task: &Task) -> Result<String> {
        let output = self.executor.execute(agent, task).await?;
        if !output.accepted {
            warn!(
                target: "wego::routing",
                role = agent.role(),
                attempts = output.attempts,
                "returning output that failed validation"
            );
        }
        Ok(output.raw)
    }
}

fn persona_agent(persona: &Persona, tier: ModelTier) -> Agent {
    Agent::new(persona.role, persona.goal, persona.backstory).with_tier(tier)
}

/// Friendly reply when the request names a day the trip does not have.
fn out_of_range_day(query: &str, ctx: &TripContext) -> Option<String> {
    let day = prompts::target_day(query)?;
    let days_count = ctx.settings.days_count.filter(|count| *count > 0)?;
    (day == 0 || day > days_count).then(|| prompts::invalid_day_reply(day, days_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TripSettings;

    fn three_day_trip() -> TripContext {
        TripContext {
            settings: TripSettings {
                days_count: Some(3),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_out_of_range_day() {
        let ctx = three_day_trip();
        assert!(out_of_range_day("dinner on day 4", &ctx).is_some());
        assert!(out_of_range_day("day 0 breakfast", &ctx).is_some());
        assert!(out_of_range_day("dinner on day 3", &ctx).is_none());
        assert!(out_of_range_day("dinner tonight", &ctx).is_none());
    }

    #[test]
    fn test_unknown_trip_length_skips_day_check() {
        assert!(out_of_range_day("day 9", &TripContext::default()).is_none());
    }
}
