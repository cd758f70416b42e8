use admission_engine::config::{AnalysisConfig, AppConfig, SubjectCatalog};
use admission_engine::db::{connect_pool, PgReferenceData};
use admission_engine::error::AppError;
use admission_engine::scoring::{
    AdmissionAnalyzer, AnalysisRequest, AnalysisResult, ReferenceSnapshot,
};
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// JSON file with the applicant's points and target faculties
    #[arg(long)]
    pub(crate) request: PathBuf,
    /// Directory of CSV reference tables; DATABASE_URL is used when omitted
    #[arg(long)]
    pub(crate) snapshot: Option<PathBuf>,
    /// JSON subject catalog overriding the configured one
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CatalogArgs {
    /// JSON subject catalog to validate and print instead of the built-in one
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

pub(crate) async fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let request = read_request(&args.request)?;

    let result = match args.snapshot {
        Some(dir) => analyze_snapshot(&request, &dir, args.catalog).await?,
        None => analyze_database(&request, args.catalog).await?,
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

pub(crate) fn run_catalog(args: CatalogArgs) -> Result<(), AppError> {
    let catalog = catalog_override(args.catalog).catalog()?;
    println!("{}", serde_json::to_string_pretty(&catalog)?);
    Ok(())
}

fn read_request(path: &Path) -> Result<AnalysisRequest, AppError> {
    let raw = std::fs::read(path)?;
    Ok(serde_json::from_slice(&raw)?)
}

fn catalog_override(catalog_path: Option<PathBuf>) -> AnalysisConfig {
    AnalysisConfig {
        concurrency: 1,
        catalog_path,
    }
}

pub(crate) async fn analyze_snapshot(
    request: &AnalysisRequest,
    dir: &Path,
    catalog_path: Option<PathBuf>,
) -> Result<AnalysisResult, AppError> {
    let catalog = catalog_override(catalog_path).catalog()?;
    let data = ReferenceSnapshot::from_dir(dir)?;
    let analyzer = AdmissionAnalyzer::new(Arc::new(data), Arc::new(catalog));
    Ok(analyzer.analyze(request).await?)
}

async fn analyze_database(
    request: &AnalysisRequest,
    catalog_path: Option<PathBuf>,
) -> Result<AnalysisResult, AppError> {
    let config = AppConfig::load()?;
    let catalog: SubjectCatalog = match catalog_path {
        Some(path) => SubjectCatalog::from_path(path)?,
        None => config.analysis.catalog()?,
    };

    let pool = connect_pool(&config.database)?;
    let analyzer = AdmissionAnalyzer::with_concurrency(
        Arc::new(PgReferenceData::new(pool)),
        Arc::new(catalog),
        config.analysis.concurrency,
    );
    Ok(analyzer.analyze(request).await?)
}
