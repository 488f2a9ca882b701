//! End-to-end run: CSV on disk through forecast and stubbed commentary.

use async_trait::async_trait;
use revenue_forecast::config::{Periodicity, PipelineConfig};
use revenue_forecast::data::RevenueTable;
use revenue_forecast::error::Result;
use revenue_forecast::narrative::CommentaryGenerator;
use revenue_forecast::pipeline::run_pipeline;
use std::io::Write;
use tempfile::NamedTempFile;

struct EchoGenerator;

#[async_trait]
impl CommentaryGenerator for EchoGenerator {
    async fn generate(&self, system_instruction: &str, prompt: &str) -> Result<String> {
        Ok(format!(
            "[{}] {}",
            system_instruction.len(),
            &prompt[..40.min(prompt.len())]
        ))
    }
}

#[tokio::test]
async fn csv_to_commentary_for_two_categories() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Date,Revenue,Category").unwrap();
    for month in 1..=12 {
        writeln!(file, "2023-{:02}-01,{}.0,Subscriptions", month, 1000 + month * 25).unwrap();
        writeln!(file, "2023-{:02}-01,{}.0,Services", month, 400 + month * 10).unwrap();
    }

    let table = RevenueTable::from_csv(file.path()).unwrap();
    assert_eq!(table.len(), 24);

    let config = PipelineConfig::new(Periodicity::Monthly, 6)
        .unwrap()
        .with_commentary_window(12)
        .unwrap();

    let outcomes = run_pipeline(&table, &config, &EchoGenerator).await.unwrap();
    assert_eq!(outcomes.len(), 2);

    for outcome in &outcomes {
        assert!(outcome.is_complete(), "{:?}", outcome.failure_message());
        let forecast = outcome.forecast.as_ref().unwrap();
        assert_eq!(forecast.rows.len(), 18);
        assert!(outcome.commentary.is_some());
    }

    assert_eq!(outcomes[0].display_label(), "Subscriptions");
    assert_eq!(outcomes[1].display_label(), "Services");
}
