//! Prompt templates sent to the generative model.

use super::traits::{GenerateTestCasesInput, SummarizeTestReportInput};

pub fn test_cases_prompt(input: &GenerateTestCasesInput) -> String {
    format!(
        r#"You are an expert QA engineer who writes browser test plans.

Website under test: {url}
Testing request: {prompt}

Write a numbered list of concrete test cases a browser automation tool could
follow against the website. Each case should name the page, the user action
and the expected result. Cover the happy path first, then edge cases that the
request implies.

Respond with a JSON object of the form {{"testCases": "<numbered list>"}}."#,
        url = input.url,
        prompt = input.testing_prompt,
    )
}

pub fn summary_prompt(input: &SummarizeTestReportInput) -> String {
    format!(
        r#"You are a QA lead reviewing the output of an automated browser test run.

Test results:
{results}

Summarize the outcome for a developer in a few sentences, then list the
actions that were performed during the run.

Respond with a JSON object of the form
{{"summary": "<short summary>", "actions": "<actions performed>"}}."#,
        results = input.test_results,
    )
}
