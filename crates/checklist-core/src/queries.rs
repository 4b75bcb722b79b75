//! The compliance check catalog.
//!
//! Every query projects the same column contract:
//! `section, item, service, site, environment, pass, link, repo`.
//! All table references are fully qualified against the `sec_metrics`
//! database because executions run in the engine's default database.
//!
//! Day-partitioned queries carry the literal [`DAY_TOKEN`] placeholder; the
//! day-window driver substitutes a concrete `YYYY-MM-DD` date before
//! submission. No validation of the produced SQL happens here; a malformed
//! query surfaces as an engine-side submission or execution failure.

use chrono::NaiveDate;

/// Placeholder substituted with a calendar date before submission.
pub const DAY_TOKEN: &str = "<<DAY>>";

/// Dashboard the baseline checks link each finding back to.
const BASELINE_DASHBOARD: &str =
    "https://redash.sec-metrics.io/dashboard/security-baseline-service-latest?p_site=";

/// One compliance check bound to its query text.
#[derive(Debug, Clone)]
pub struct CheckQuery {
    pub section: &'static str,
    pub item: &'static str,
    pub sql: String,
}

impl CheckQuery {
    /// True when the query still carries the day placeholder and must go
    /// through the day-window driver.
    pub fn day_partitioned(&self) -> bool {
        self.sql.contains(DAY_TOKEN)
    }

    /// Substitute the day placeholder with a concrete date.
    pub fn bind_day(&self, day: NaiveDate) -> String {
        self.sql
            .replace(DAY_TOKEN, &day.format("%Y-%m-%d").to_string())
    }
}

/// The full catalog, in run order.
///
/// Order only matters for the readability of diagnostics; each record
/// carries its own `section`/`item`.
pub fn checklist() -> Vec<CheckQuery> {
    vec![
        // Risk management
        risk_assessment_query(),
        // Infrastructure
        baseline_rule_query("Web Applications", "Set STS", "rule_10035"),
        // Development
        org_two_factor_query(),
        branch_protection_query(),
        // Web applications
        baseline_rule_query("Web Applications", "CSP present", "rule_10038"),
        baseline_rule_query("Web Applications", "Content type", "rule_10019"),
        baseline_rule_query("Web Applications", "Cookies httponly", "rule_10010"),
        baseline_rule_query("Web Applications", "Cookies secure", "rule_10011"),
        observatory_query(),
        baseline_status_query("Web Applications", "No baseline failures"),
        // Security features
        baseline_rule_query("Security Features", "Anti CSRF tokens", "rule_10202"),
        // Common issues
        baseline_rule_query("Web Applications", "Prevent reverse tabnabbing", "rule_10108"),
    ]
}

/// Services must have a recorded risk assessment.
fn risk_assessment_query() -> CheckQuery {
    CheckQuery {
        section: "Risk Management",
        item: "Must have RRA",
        sql: "SELECT 'Risk Management' AS section, 'Must have RRA' AS item, \
              sec_metrics.metadata_services.service, '' AS site, 'global' AS environment, \
              CASE WHEN sec_metrics.metadata_services.rradate = '' THEN False ELSE True END pass, \
              sec_metrics.metadata_services.rra AS link, '' AS repo \
              FROM sec_metrics.metadata_services"
            .to_string(),
    }
}

/// One baseline scan rule, checked against a single day's partition.
fn baseline_rule_query(section: &'static str, item: &'static str, rule: &str) -> CheckQuery {
    CheckQuery {
        section,
        item,
        sql: format!(
            "SELECT '{section}' AS section, '{item}' AS item, \
             sec_metrics.metadata_urls.service, sec_metrics.baseline_details.site, \
             sec_metrics.metadata_urls.status AS environment, \
             CASE WHEN sec_metrics.baseline_details.status = 'pass' THEN True ELSE False END pass, \
             CONCAT('{BASELINE_DASHBOARD}', sec_metrics.baseline_details.site) AS link, '' AS repo \
             FROM sec_metrics.baseline_details, sec_metrics.metadata_urls \
             WHERE sec_metrics.baseline_details.site = sec_metrics.metadata_urls.url \
             AND sec_metrics.baseline_details.rule = '{rule}' \
             AND sec_metrics.baseline_details.day = '{DAY_TOKEN}'"
        ),
    }
}

/// Latest overall baseline status per site, no day partition.
fn baseline_status_query(section: &'static str, item: &'static str) -> CheckQuery {
    CheckQuery {
        section,
        item,
        sql: format!(
            "SELECT '{section}' AS section, '{item}' AS item, \
             sec_metrics.metadata_urls.service, sec_metrics.baseline_sites_latest.site, \
             sec_metrics.metadata_urls.status AS environment, \
             CASE WHEN sec_metrics.baseline_sites_latest.status = 'pass' THEN True ELSE False END pass, \
             CONCAT('{BASELINE_DASHBOARD}', sec_metrics.baseline_sites_latest.site) AS link, '' AS repo \
             FROM sec_metrics.baseline_sites_latest, sec_metrics.metadata_urls \
             WHERE sec_metrics.baseline_sites_latest.site = sec_metrics.metadata_urls.url"
        ),
    }
}

/// Mozilla Observatory grade per monitored site, checked against one day.
fn observatory_query() -> CheckQuery {
    CheckQuery {
        section: "Web Applications",
        item: "A plus on Observatory",
        sql: format!(
            "SELECT 'Web Applications' AS section, 'A plus on Observatory' AS item, \
             sec_metrics.metadata_urls.service, sec_metrics.observatory.site, \
             sec_metrics.metadata_urls.status AS environment, \
             CASE WHEN sec_metrics.observatory.observatory_score >= 100 THEN True ELSE False END pass, \
             CONCAT('https://observatory.mozilla.org/analyze/', sec_metrics.observatory.site) AS link, \
             '' AS repo \
             FROM sec_metrics.observatory, sec_metrics.metadata_urls \
             WHERE sec_metrics.observatory.site = sec_metrics.metadata_urls.url \
             AND sec_metrics.observatory.day = '{DAY_TOKEN}'"
        ),
    }
}

/// Two-factor enforcement for every monitored source-hosting organization.
fn org_two_factor_query() -> CheckQuery {
    CheckQuery {
        section: "Development",
        item: "Enforce 2FA",
        sql: r#"
        -- Extract organization 2FA status.
        -- Not a boolean at the source, as it can be unavailable;
        -- "enabled" counts as pass, everything else as fail.
        WITH
        -- Only the most recent snapshot matters
        latestRecord AS
            (SELECT date, body.login, body.two_factor_requirement_enabled
            FROM sec_metrics.github_object
            JOIN
                (SELECT max(github_object.date) AS MaxDay
                FROM sec_metrics.github_object) md ON github_object.date = MaxDay
            -- make sure we're working with an org record
            WHERE body.has_organization_projects IS NOT NULL),
        -- From orgs we're actively monitoring
        orgsOfInterest AS
            (SELECT DISTINCT
            "split_part"("repo", '/', 4) "Org"
            FROM sec_metrics.metadata_repos),
        -- only report once per org
        org_2fa AS
            (SELECT
            date,
            login AS "Organization",
            CASE two_factor_requirement_enabled
            WHEN true THEN true
            ELSE false
            END AS "2FA"
            FROM latestRecord
            JOIN orgsOfInterest ON lower(login) = lower(Org))

        SELECT DISTINCT
            'Development' AS section,
            'Enforce 2FA' AS item,
            a.service,
            '' AS site,
            'global' AS environment,
            CONCAT('https://', a.Host, '/organizations/', a.Org, '/settings/security') AS link,
            org_2fa."2FA" AS pass,
            '' AS repo
        FROM sec_metrics.metadata_repo_parsed AS a
        JOIN
            org_2fa
            ON a.Org = "Organization"
        ORDER BY (a.service)
        "#
        .to_string(),
    }
}

/// Default-branch protection, aggregated per repository over the latest snapshot.
fn branch_protection_query() -> CheckQuery {
    CheckQuery {
        section: "Development",
        item: "Enforce branch protection",
        sql: "SELECT 'Development' AS section, 'Enforce branch protection' AS item, \
              service, '' AS site, 'global' AS environment, \
              CONCAT('https://github.com/', Org, '/', Repo) AS link, \
              every(protected) AS pass, '' AS repo \
              FROM sec_metrics.default_branch_protection_status \
              JOIN (SELECT max(default_branch_protection_status.date) AS MaxDay \
              FROM sec_metrics.default_branch_protection_status) md \
              ON default_branch_protection_status.date = MaxDay \
              GROUP BY (service, Org, Repo) \
              ORDER BY (service, Org, Repo)"
            .to_string(),
    }
}
