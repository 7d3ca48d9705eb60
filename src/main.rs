use anyhow::{bail, Context, Result};
use gradebatch::modules::jobs::engine::StepConfig;
use gradebatch::modules::jobs::JobStatus;
use gradebatch::shared::utils::logger::init_logger;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Imports one exam-results file and waits for the job to finish.
///
/// Usage: gradebatch <file.csv> [student_id]
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logger();

    let mut args = std::env::args().skip(1);
    let Some(file) = args.next() else {
        bail!("Usage: gradebatch <file.csv> [student_id]");
    };
    let student_id = args.next();

    let upload_directory = std::env::var("BATCH_UPLOAD_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp/batch-uploads"));

    let service = gradebatch::build_batch_service(upload_directory, StepConfig::from_env());

    let contents = std::fs::read(&file).with_context(|| format!("Failed to read '{}'", file))?;
    let original_name = Path::new(&file)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("uploaded_file");

    let execution_id = service
        .start_import_job(original_name, &contents)
        .await
        .context("Failed to start import job")?;
    println!("Batch job started, execution id {}", execution_id);

    loop {
        let status = service.get_job_status(execution_id).await?;
        let parsed: JobStatus = status
            .status
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;
        if parsed.is_terminal() {
            let execution = service.get_job_execution(execution_id).await?;
            println!(
                "Execution {} finished: {} (read {}, written {}, filtered {}, skipped {})",
                execution.id,
                execution.status,
                execution.counters.read_count,
                execution.counters.write_count,
                execution.counters.filter_count,
                execution.counters.skip_count
            );
            break;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    if let Some(student_id) = student_id {
        match service.get_student_results(&student_id).await? {
            Some(result) => println!("{}", serde_json::to_string_pretty(&result)?),
            None => println!("No accepted records for student '{}'", student_id),
        }
    }

    Ok(())
}
