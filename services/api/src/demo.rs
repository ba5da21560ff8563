use crate::infra::{demo_profile, parse_date, today, PortalStores};
use chrono::NaiveDate;
use clap::Args;
use scheme_portal::auth::Identity;
use scheme_portal::error::AppError;
use scheme_portal::store::sample_schemes;
use scheme_portal::workflows::applications::{
    ApplicationService, ApplicationSubmission, StatusUpdate,
};
use scheme_portal::workflows::edit_requests::{Decision, EditRequestService, EditRequestSubmission};
use scheme_portal::workflows::profiles::{ApplicantProfile, DeclaredNumber, ProfileRepository};
use scheme_portal::workflows::schemes::{EligibilityReport, EligibilityService, Scheme};
use serde_json::json;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date for validity windows (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Override the demo citizen's declared annual income.
    #[arg(long)]
    pub(crate) income: Option<i64>,
    /// Override the demo citizen's declared age.
    #[arg(long)]
    pub(crate) age: Option<i64>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct SchemesArgs {
    /// Print the catalog as JSON instead of a summary.
    #[arg(long)]
    pub(crate) json: bool,
    /// Evaluation date for validity windows (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn run_schemes(args: SchemesArgs) -> Result<(), AppError> {
    let schemes = sample_schemes();
    if args.json {
        match serde_json::to_string_pretty(&schemes) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Catalog unavailable: {err}"),
        }
        return Ok(());
    }

    let today = args.today.unwrap_or_else(today);
    println!("Scheme catalog ({} schemes, evaluated {today})", schemes.len());
    for scheme in &schemes {
        render_scheme(scheme, today);
    }
    Ok(())
}

fn render_scheme(scheme: &Scheme, today: NaiveDate) {
    let window = if scheme.accepting_applications(today) {
        "open"
    } else {
        "closed"
    };
    println!("- {} [{}] {} ({window})", scheme.id, scheme.category, scheme.name);
    match serde_json::to_value(&scheme.eligibility_criteria) {
        Ok(serde_json::Value::Object(criteria)) if !criteria.is_empty() => {
            for (key, value) in criteria {
                println!("    {key}: {value}");
            }
        }
        _ => println!("    criteria: none"),
    }
    if !scheme.documents_required.is_empty() {
        println!("    documents: {}", scheme.documents_required.join(", "));
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { today: as_of, income, age } = args;
    let as_of = as_of.unwrap_or_else(today);

    let stores = PortalStores::build(true)?;
    let mut profile = demo_profile();
    if let Some(income) = income {
        profile.income = DeclaredNumber::from(income);
    }
    if let Some(age) = age {
        profile.age = DeclaredNumber::from(age);
    }
    let citizen = profile.citizen_id.clone();
    stores.profiles.insert(profile.clone())?;

    let eligibility = EligibilityService::new(
        Arc::clone(&stores.catalog),
        Arc::clone(&stores.profiles),
    );
    let applications = ApplicationService::new(
        Arc::clone(&stores.applications),
        Arc::clone(&stores.catalog),
    );
    let edits = EditRequestService::new(
        Arc::clone(&stores.edit_requests),
        Arc::clone(&stores.profiles),
    );

    println!("Scheme portal demo (evaluated {as_of})");
    render_profile("Registered profile", &profile);

    let report = match eligibility.eligibility_for(&citizen, as_of) {
        Ok(report) => report,
        Err(err) => {
            println!("  Eligibility unavailable: {err}");
            return Ok(());
        }
    };
    render_report(&report);

    println!("\nApplication intake");
    let Some(first) = report.eligible_schemes.first() else {
        println!("- No eligible schemes; skipping application intake");
        return Ok(());
    };
    let submission = ApplicationSubmission {
        scheme_id: first.scheme.id.0.clone(),
    };
    let application = match applications.submit(&citizen, submission.clone()) {
        Ok(application) => application,
        Err(err) => {
            println!("  Submission rejected: {err}");
            return Ok(());
        }
    };
    println!(
        "- Submitted {} for {} -> {}",
        application.id,
        application.scheme_id,
        application.status.label()
    );
    match applications.submit(&citizen, submission) {
        Ok(_) => println!("- Duplicate submission unexpectedly accepted"),
        Err(err) => println!("- Duplicate submission refused: {err}"),
    }
    match applications.update_status(
        &application.id,
        StatusUpdate {
            action: Some("approve".to_string()),
            remarks: Some("documents verified at district office".to_string()),
            ..StatusUpdate::default()
        },
    ) {
        Ok(updated) => println!(
            "- Admin set {} to {} ({})",
            updated.id,
            updated.status.label(),
            updated.remarks.as_deref().unwrap_or("no remarks")
        ),
        Err(err) => println!("  Status update failed: {err}"),
    }

    println!("\nProfile edit requests");
    let unfreeze = EditRequestSubmission {
        changes: Some(json!({"district": "Satara", "frozen": false})),
        reason: Some("relocated after marriage".to_string()),
    };
    let request = match edits.create(&citizen, unfreeze) {
        Ok(request) => request,
        Err(err) => {
            println!("  Edit request rejected: {err}");
            return Ok(());
        }
    };
    println!("- Citizen filed {} -> {}", request.id, request.status.label());
    match edits.resolve(&request.id, Decision::Approve) {
        Ok(resolved) => println!("- Admin resolved {} -> {}", resolved.id, resolved.status.label()),
        Err(err) => println!("  Approval failed: {err}"),
    }
    match edits.resolve(&request.id, Decision::Approve) {
        Ok(_) => println!("- Second approval unexpectedly accepted"),
        Err(err) => println!("- Second approval refused: {err}"),
    }

    let income_change = EditRequestSubmission {
        changes: Some(json!({"income": 90_000})),
        reason: Some("lost seasonal work".to_string()),
    };
    if let Ok(request) = edits.create(&citizen, income_change) {
        match edits.resolve(&request.id, Decision::Reject) {
            Ok(resolved) => println!(
                "- Admin resolved {} -> {} (profile untouched)",
                resolved.id,
                resolved.status.label()
            ),
            Err(err) => println!("  Rejection failed: {err}"),
        }
    }

    match edits.list(&Identity::citizen(&citizen)) {
        Ok(requests) => println!("- {} edit requests on file", requests.len()),
        Err(err) => println!("  Edit request listing unavailable: {err}"),
    }
    match edits.profile(&citizen) {
        Ok(updated) => render_profile("\nProfile after resolution", &updated),
        Err(err) => println!("  Profile unavailable: {err}"),
    }

    Ok(())
}

fn render_profile(title: &str, profile: &ApplicantProfile) {
    println!("{title}");
    println!(
        "- {} | age {} | income {} | {} | {}",
        profile.citizen_id,
        profile.age.or_zero(),
        profile.income.or_zero(),
        profile.gender.as_deref().unwrap_or("-"),
        profile.caste.as_deref().unwrap_or("-")
    );
    println!(
        "- district {} | frozen {}",
        profile.district.as_deref().unwrap_or("-"),
        profile.frozen
    );
}

fn render_report(report: &EligibilityReport) {
    println!(
        "\nEligibility: {}/{} schemes",
        report.eligible_count, report.total_schemes
    );
    for entry in &report.eligible_schemes {
        println!(
            "- {} ({:.2}) {}{}",
            entry.scheme.id,
            entry.eligibility_confidence,
            entry.eligibility_reason,
            if entry.accepting_applications {
                ""
            } else {
                " [window closed]"
            }
        );
    }
    for entry in &report.ineligible_schemes {
        println!("- {} ({:.2}) {}", entry.scheme_id, entry.confidence, entry.reason);
    }
    if !report.coerced_fields.is_empty() {
        println!("  Note: {:?} evaluated as zero", report.coerced_fields);
    }
}
