use super::types::{ActionResult, RunResults};
use crate::runner::state::StageStatus;
use anyhow::Result;
use std::path::Path;

/// Generate HTML report
pub fn generate(results: &RunResults, output: Option<&Path>) -> Result<()> {
    let html = generate_html(results);

    if let Some(path) = output {
        std::fs::write(path, html)?;
        println!("HTML report saved to: {}", path.display());
    } else {
        println!("{}", html);
    }

    Ok(())
}

pub fn generate_html(results: &RunResults) -> String {
    let (status_text, status_class) = match &results.result {
        ActionResult::Success(_) => ("Passed", "passed"),
        ActionResult::Failure(_) => ("Failed", "failed"),
    };

    let body_html = match &results.result {
        ActionResult::Success(report) => format!(
            r#"
            <section class="card">
                <h2>Summary</h2>
                <p class="prose">{}</p>
            </section>
            <section class="card">
                <h2>Actions</h2>
                <p class="prose">{}</p>
            </section>"#,
            html_escape(&report.summary),
            html_escape(&report.actions)
        ),
        ActionResult::Failure(error) => format!(
            r#"
            <section class="card">
                <h2>Error</h2>
                <div class="error-message">{}</div>
            </section>"#,
            html_escape(error)
        ),
    };

    let plan_html = results
        .trace
        .plan
        .as_deref()
        .map(|plan| {
            format!(
                r#"
            <section class="card">
                <details>
                    <summary>Generated Test Plan</summary>
                    <pre>{}</pre>
                </details>
            </section>"#,
                html_escape(plan)
            )
        })
        .unwrap_or_default();

    let mut stages_html = String::new();
    for record in &results.trace.stages {
        let (icon, class, error_html) = match &record.status {
            StageStatus::Passed => ("✓", "passed", String::new()),
            StageStatus::Failed { error } => (
                "✗",
                "failed",
                format!(r#"<div class="error-message">{}</div>"#, html_escape(error)),
            ),
        };
        stages_html.push_str(&format!(
            r#"
                <div class="stage {class}">
                    <div class="stage-icon">{icon}</div>
                    <div class="stage-content">
                        <div class="stage-name">{}</div>
                        <span class="duration">{}</span>
                        {error_html}
                    </div>
                </div>"#,
            record.stage.label(),
            format_duration(record.duration_ms),
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Test Report - {url}</title>
    <style>
        :root {{
            --bg-primary: #0a0f1d;
            --bg-secondary: #141b2d;
            --border: #374151;
            --text-primary: #f9fafb;
            --text-secondary: #9ca3af;
            --green: #10b981;
            --red: #ef4444;
            --purple: #8b5cf6;
        }}
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{
            font-family: 'Inter', system-ui, -apple-system, sans-serif;
            background: var(--bg-primary);
            color: var(--text-primary);
            line-height: 1.5;
            padding: 3rem 1rem;
        }}
        .container {{ max-width: 900px; margin: 0 auto; }}
        header {{ margin-bottom: 2rem; }}
        .eyebrow {{
            font-size: 0.875rem;
            font-weight: 600;
            color: var(--purple);
            text-transform: uppercase;
            letter-spacing: 0.1em;
        }}
        h1 {{ font-size: 2rem; font-weight: 800; }}
        .target {{ color: var(--text-secondary); word-break: break-all; }}
        .badge {{
            display: inline-block;
            padding: 0.25rem 0.75rem;
            border-radius: 9999px;
            font-size: 0.75rem;
            font-weight: 600;
            text-transform: uppercase;
        }}
        .badge.passed {{ background: rgba(16, 185, 129, 0.1); color: var(--green); }}
        .badge.failed {{ background: rgba(239, 68, 68, 0.1); color: var(--red); }}
        .card {{
            background: var(--bg-secondary);
            border: 1px solid var(--border);
            border-radius: 1rem;
            padding: 1.5rem;
            margin-bottom: 1.5rem;
        }}
        .card h2 {{ font-size: 1.125rem; margin-bottom: 0.75rem; }}
        .prose {{ white-space: pre-wrap; }}
        pre {{
            margin-top: 1rem;
            white-space: pre-wrap;
            font-family: 'JetBrains Mono', monospace;
            font-size: 0.875rem;
        }}
        summary {{ cursor: pointer; font-weight: 600; }}
        .stage {{ display: flex; gap: 1rem; padding: 0.5rem 0; }}
        .stage-icon {{ width: 1.5rem; text-align: center; }}
        .stage.passed .stage-icon {{ color: var(--green); }}
        .stage.failed .stage-icon {{ color: var(--red); }}
        .duration {{ color: var(--text-secondary); font-size: 0.75rem; }}
        .error-message {{
            background: rgba(239, 68, 68, 0.1);
            border: 1px solid rgba(239, 68, 68, 0.2);
            border-radius: 0.5rem;
            padding: 0.75rem;
            margin-top: 0.5rem;
            color: #fca5a5;
            font-family: 'JetBrains Mono', monospace;
            font-size: 0.8125rem;
        }}
        .meta {{
            margin-top: 3rem;
            color: var(--text-secondary);
            font-size: 0.875rem;
            text-align: center;
        }}
    </style>
</head>
<body>
    <div class="container">
        <header>
            <div class="eyebrow">AI Test Agent</div>
            <h1>Test Run Report <span class="badge {status_class}">{status_text}</span></h1>
            <div class="target">{url}</div>
        </header>

        <section class="card">
            <h2>Testing Request</h2>
            <p class="prose">{prompt}</p>
        </section>
        {body_html}
        {plan_html}
        <section class="card">
            <h2>Pipeline ({total})</h2>
            {stages_html}
        </section>

        <div class="meta">Run: {run_id} · Generated: {generated_at}</div>
    </div>
</body>
</html>"#,
        url = html_escape(&results.url),
        prompt = html_escape(&results.prompt),
        total = format_duration(results.trace.total_duration_ms),
        run_id = html_escape(&results.run_id),
        generated_at = html_escape(&results.generated_at),
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        let minutes = ms / 60000;
        let seconds = (ms % 60000) as f64 / 1000.0;
        format!("{}m {:.0}s", minutes, seconds)
    }
}
