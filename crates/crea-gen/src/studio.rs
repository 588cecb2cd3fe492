//! The studio: one board, four forms, one gateway
//!
//! `Studio` is the single owner of the session's [`AssetStore`]. Forms only
//! reach the store through [`Studio::commit`], and the exporter only sees
//! rendered cards. Every user-visible outcome is queued as a [`Notice`].

use crate::config::StudioConfig;
use crate::form::{
    BrandVoiceTask, CopyTask, Form, FormStatus, ModerationTask, SubmitOutcome, VisualTask,
};
use crate::providers;
use crate::task::{
    BrandVoiceOutput, BrandVoiceParams, CopyOutput, CopyParams, Gateway, ModerationParams,
    TaskKind, VisualOutput, VisualParams,
};
use chrono::{DateTime, Utc};
use crea_board::{
    render_board, Asset, AssetStore, BoardExporter, Card, ExportOutcome, ExportSettings,
    ModerationVerdict, StoreEvent, SubscriptionId,
};
use crea_core::{AssetId, Notice, Result};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

pub struct Studio {
    store: AssetStore,
    copy: Form<CopyTask>,
    brand_voice: Form<BrandVoiceTask>,
    visual: Form<VisualTask>,
    moderation: Form<ModerationTask>,
    exporter: BoardExporter,
    gateway: Box<dyn Gateway>,
    notices: Rc<RefCell<Vec<Notice>>>,
}

impl Studio {
    pub fn new(gateway: Box<dyn Gateway>, export: ExportSettings) -> Self {
        let notices = Rc::new(RefCell::new(Vec::new()));
        let mut store = AssetStore::new();

        let feed = Rc::clone(&notices);
        store.subscribe(move |event: &StoreEvent| feed.borrow_mut().push(event.notice()));

        Self {
            store,
            copy: Form::new(),
            brand_voice: Form::new(),
            visual: Form::new(),
            moderation: Form::new(),
            exporter: BoardExporter::new(export),
            gateway,
            notices,
        }
    }

    /// Build a studio around the named provider, or the configured default
    pub fn from_config(config: &StudioConfig, provider: Option<&str>) -> Result<Self> {
        let name = provider.unwrap_or_else(|| config.default_provider());
        let gateway = providers::create_gateway(name, config)?;
        tracing::info!(provider = name, "studio ready");
        Ok(Self::new(gateway, config.export.clone()))
    }

    pub fn gateway(&self) -> &dyn Gateway {
        self.gateway.as_ref()
    }

    pub fn store(&self) -> &AssetStore {
        &self.store
    }

    /// Register an extra board observer
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&StoreEvent) + 'static,
    {
        self.store.subscribe(callback)
    }

    pub fn copy_form(&self) -> &Form<CopyTask> {
        &self.copy
    }

    pub fn brand_voice_form(&self) -> &Form<BrandVoiceTask> {
        &self.brand_voice
    }

    pub fn visual_form(&self) -> &Form<VisualTask> {
        &self.visual
    }

    pub fn moderation_form(&self) -> &Form<ModerationTask> {
        &self.moderation
    }

    pub fn status(&self, kind: TaskKind) -> FormStatus {
        match kind {
            TaskKind::Copy => self.copy.status(),
            TaskKind::BrandVoice => self.brand_voice.status(),
            TaskKind::Visual => self.visual.status(),
            TaskKind::Moderation => self.moderation.status(),
        }
    }

    pub fn submit_copy(&mut self, params: CopyParams) -> Result<SubmitOutcome<CopyOutput>> {
        let outcome = self.copy.submit(params, self.gateway.as_ref());
        self.record(outcome)
    }

    pub fn submit_brand_voice(
        &mut self,
        params: BrandVoiceParams,
    ) -> Result<SubmitOutcome<BrandVoiceOutput>> {
        let outcome = self.brand_voice.submit(params, self.gateway.as_ref());
        self.record(outcome)
    }

    pub fn submit_visual(&mut self, params: VisualParams) -> Result<SubmitOutcome<VisualOutput>> {
        let outcome = self.visual.submit(params, self.gateway.as_ref());
        self.record(outcome)
    }

    pub fn submit_moderation(
        &mut self,
        params: ModerationParams,
    ) -> Result<SubmitOutcome<ModerationVerdict>> {
        let outcome = self.moderation.submit(params, self.gateway.as_ref());
        self.record(outcome)
    }

    fn record<O>(&self, outcome: Result<SubmitOutcome<O>>) -> Result<SubmitOutcome<O>> {
        if let Ok(SubmitOutcome::Failed(notice)) = &outcome {
            self.push_notice(notice.clone());
        }
        outcome
    }

    /// Commit the held result of one form to the board
    pub fn commit(&mut self, kind: TaskKind) -> Result<Asset> {
        match kind {
            TaskKind::Copy => self.copy.commit(&mut self.store),
            TaskKind::BrandVoice => self.brand_voice.commit(&mut self.store),
            TaskKind::Visual => self.visual.commit(&mut self.store),
            TaskKind::Moderation => self.moderation.commit(&mut self.store),
        }
    }

    pub fn remove(&mut self, id: AssetId) -> Option<Asset> {
        self.store.remove(id)
    }

    /// Remove by position in board order (0 is the most recent)
    pub fn remove_at(&mut self, index: usize) -> Option<Asset> {
        let id = self.store.iter().nth(index).map(|a| a.id())?;
        self.store.remove(id)
    }

    pub fn clear(&mut self) {
        self.store.clear();
    }

    pub fn list(&self) -> Vec<Asset> {
        self.store.list()
    }

    pub fn cards(&self, now: DateTime<Utc>) -> Vec<Card> {
        render_board(self.store.iter(), now)
    }

    /// Render the current board and write it to `path`
    pub fn export(&self, path: &Path) -> Result<ExportOutcome> {
        let cards = self.cards(Utc::now());
        if !cards.is_empty() {
            self.push_notice(ExportOutcome::starting_notice());
        }

        match self.exporter.export(&cards, path) {
            Ok(outcome) => {
                self.push_notice(outcome.notice());
                Ok(outcome)
            }
            Err(e) => {
                tracing::error!(error = %e, "export failed");
                self.push_notice(ExportOutcome::failure_notice());
                Err(e)
            }
        }
    }

    /// Export into `dir` under the configured file name
    pub fn export_to_dir(&self, dir: &Path) -> Result<ExportOutcome> {
        let path = dir.join(&self.exporter.settings().file_name);
        self.export(&path)
    }

    /// Drain the notices raised since the last call
    pub fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.borrow_mut())
    }

    fn push_notice(&self, notice: Notice) {
        tracing::debug!(title = %notice.title, "notice");
        self.notices.borrow_mut().push(notice);
    }
}

impl std::fmt::Debug for Studio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("gateway", &self.gateway.name())
            .field("assets", &self.store.len())
            .field("copy", &self.copy.status())
            .field("brand_voice", &self.brand_voice.status())
            .field("visual", &self.visual.status())
            .field("moderation", &self.moderation.status())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::MockGateway;
    use crate::task::GenerationOutput;
    use crea_board::AssetType;
    use crea_core::CreaError;

    fn acme() -> CopyParams {
        CopyParams {
            prompt_template: "Generate a catchy tagline.".to_string(),
            audience: "Shoppers".to_string(),
            platform: "Instagram".to_string(),
            product_name: "Acme".to_string(),
            product_description: "Widgets for everyone".to_string(),
        }
    }

    fn studio_with(gateway: MockGateway) -> Studio {
        Studio::new(Box::new(gateway), ExportSettings::default())
    }

    fn temp_dir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("crea_studio_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_acme_scenario() {
        let mut studio = studio_with(MockGateway::scripted(vec![Ok(GenerationOutput::Copy(
            CopyOutput {
                marketing_copy: "Acme: Widgets Worth Wanting".to_string(),
            },
        ))]));

        assert!(studio.submit_copy(acme()).unwrap().is_success());
        studio.commit(TaskKind::Copy).unwrap();

        let assets = studio.list();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].asset_type(), AssetType::Copy);
        assert_eq!(assets[0].content(), "Acme: Widgets Worth Wanting");

        let notices = studio.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].title, "Asset Added to Board");
        assert_eq!(
            notices[0].description.as_deref(),
            Some("New 'Copy' asset has been saved.")
        );
        assert!(studio.take_notices().is_empty());
    }

    #[test]
    fn test_failure_notice_queued_and_board_untouched() {
        let mut studio = studio_with(MockGateway::scripted(vec![Err(
            CreaError::GenerationError("503".to_string()),
        )]));

        let outcome = studio
            .submit_moderation(ModerationParams {
                text: "Fresh coffee every morning".to_string(),
            })
            .unwrap();
        assert!(!outcome.is_success());
        assert!(studio.commit(TaskKind::Moderation).is_err());
        assert!(studio.list().is_empty());

        let notices = studio.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(
            notices[0].description.as_deref(),
            Some("Failed to moderate content. Please try again.")
        );
    }

    #[test]
    fn test_forms_are_independent() {
        let mut studio = studio_with(MockGateway::new());
        studio.submit_copy(acme()).unwrap();
        studio
            .submit_moderation(ModerationParams {
                text: "Fresh coffee every morning".to_string(),
            })
            .unwrap();

        assert_eq!(studio.status(TaskKind::Copy), FormStatus::Succeeded);
        assert_eq!(studio.status(TaskKind::Moderation), FormStatus::Succeeded);
        assert_eq!(studio.status(TaskKind::Visual), FormStatus::Idle);

        studio.commit(TaskKind::Moderation).unwrap();
        studio.commit(TaskKind::Copy).unwrap();
        let types: Vec<AssetType> = studio.list().iter().map(|a| a.asset_type()).collect();
        assert_eq!(types, vec![AssetType::Copy, AssetType::Moderation]);
    }

    #[test]
    fn test_remove_at_and_clear() {
        let mut studio = studio_with(MockGateway::new());
        for _ in 0..3 {
            studio.submit_copy(acme()).unwrap();
            studio.commit(TaskKind::Copy).unwrap();
        }
        let newest = studio.list()[0].id();

        let removed = studio.remove_at(0).unwrap();
        assert_eq!(removed.id(), newest);
        assert!(studio.remove_at(5).is_none());
        assert_eq!(studio.list().len(), 2);

        studio.clear();
        assert!(studio.list().is_empty());
        let titles: Vec<String> = studio.take_notices().into_iter().map(|n| n.title).collect();
        assert_eq!(titles.last().map(String::as_str), Some("Board Cleared"));
        assert!(titles.contains(&"Asset Removed".to_string()));
    }

    #[test]
    fn test_export_empty_and_populated() {
        let dir = temp_dir();
        let mut studio = Studio::new(
            Box::new(MockGateway::new()),
            ExportSettings {
                card_width_px: 200,
                scale: 1,
                ..Default::default()
            },
        );

        let outcome = studio.export_to_dir(&dir).unwrap();
        assert_eq!(outcome, ExportOutcome::NothingToExport);
        let notices = studio.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].title, "Board is Empty");

        studio.submit_copy(acme()).unwrap();
        studio.commit(TaskKind::Copy).unwrap();
        studio.take_notices();

        let outcome = studio.export_to_dir(&dir).unwrap();
        let path = dir.join("CreaPrompt-Campaign-Board.pdf");
        assert!(matches!(outcome, ExportOutcome::Exported { card_count: 1, .. }));
        assert!(path.exists());
        let titles: Vec<String> = studio.take_notices().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["Exporting...", "Export Successful!"]);
        assert_eq!(studio.list().len(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_from_config_with_mock() {
        let studio = Studio::from_config(&StudioConfig::default(), Some("mock")).unwrap();
        assert_eq!(studio.gateway().name(), "mock");
    }
}
