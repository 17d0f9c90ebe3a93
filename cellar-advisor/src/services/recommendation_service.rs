//! Recommendation service
//!
//! Wires the pure recommender to its stores: loads consumption history and
//! rotation state for a user, ranks the candidates, then records the picks
//! through the rotation store's atomic `mark_shown`. Store failures are
//! logged and degrade to empty history or rotation.

use crate::services::recommender::{
    Candidate, Recommendation, RecommendationContext, Recommender, RecommenderConfig,
};
use crate::services::rotation::RotationState;
use crate::stores::{ConsumptionHistory, RotationStore};
use crate::types::RandomSource;
use cellar_common::config::AdvisorSettings;
use cellar_common::time;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceSettings {
    pub top_k: usize,
    pub rotation_window_days: i64,
    pub history_window_days: i64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self::from(&AdvisorSettings::default())
    }
}

impl From<&AdvisorSettings> for ServiceSettings {
    fn from(settings: &AdvisorSettings) -> Self {
        Self {
            top_k: settings.top_k,
            rotation_window_days: settings.rotation_window_days,
            history_window_days: settings.history_window_days,
        }
    }
}

pub struct RecommendationService {
    history: Arc<dyn ConsumptionHistory>,
    rotation: Arc<dyn RotationStore>,
    settings: ServiceSettings,
}

impl RecommendationService {
    pub fn new(
        history: Arc<dyn ConsumptionHistory>,
        rotation: Arc<dyn RotationStore>,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            history,
            rotation,
            settings,
        }
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Recommend for `user` as of now
    pub async fn recommend_for(
        &self,
        user: &str,
        context: &RecommendationContext,
        candidates: Vec<Candidate>,
        rng: &mut (dyn RandomSource + Send),
    ) -> Recommendation {
        self.recommend_for_at(user, context, candidates, time::now(), rng)
            .await
    }

    pub async fn recommend_for_at(
        &self,
        user: &str,
        context: &RecommendationContext,
        mut candidates: Vec<Candidate>,
        now: DateTime<Utc>,
        rng: &mut (dyn RandomSource + Send),
    ) -> Recommendation {
        let since = time::before(now, time::days(self.settings.history_window_days));
        let opened: HashSet<String> = match self.history.opened_since(user, since).await {
            Ok(ids) => ids.into_iter().collect(),
            Err(e) => {
                warn!(user, error = %e, "Consumption history unavailable, ignoring");
                HashSet::new()
            }
        };
        for candidate in &mut candidates {
            candidate.opened_recently |= opened.contains(&candidate.bottle_id);
        }

        let window = self.settings.rotation_window_days;
        let rotation = match self.rotation.load(user, window, now).await {
            Ok(state) => state,
            Err(e) => {
                warn!(user, error = %e, "Rotation state unavailable, starting empty");
                RotationState::new(window)
            }
        };

        let recommender = Recommender::new(RecommenderConfig {
            top_k: self.settings.top_k,
        });
        let recommendation = recommender.recommend(context, &candidates, rotation, now, rng);

        let picked: Vec<String> = recommendation
            .picks
            .iter()
            .map(|p| p.candidate.bottle_id.clone())
            .collect();
        if !picked.is_empty() {
            if let Err(e) = self.rotation.mark_shown(user, &picked, window, now).await {
                warn!(user, error = %e, "Failed to persist rotation state");
            }
        }

        info!(
            user,
            candidates = candidates.len(),
            picks = picked.len(),
            recently_opened = opened.len(),
            "Recommendation served"
        );

        recommendation
    }

    /// Record that `user` opened `bottle_id`
    pub async fn record_opened(&self, user: &str, bottle_id: &str) -> cellar_common::Result<()> {
        self.history.record_opened(user, bottle_id, time::now()).await
    }
}
