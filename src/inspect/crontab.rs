use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use rusqlite::Connection;
use strsim::normalized_levenshtein;

use crate::db;
use crate::report::ReportContext;

static ALWAYS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bsh\s+always\.sh\b").unwrap());

/// Scheduled jobs every installation is expected to carry.
const REFERENCE_CRONTAB: &str = "\
30 1 * * * sh /opt/gbase_workspace/scripts/check_hole_lean/bin/run_test.sh
*/5 * * * * sh /opt/gbase_workspace/scripts/monitor/bin/monitor.sh
30 18 */15 * * cd /opt/gbase_workspace/scripts/monitor/logs;tar -czf abnormal.log.tar.gz abnormal.log
30 12 * * * sh /opt/gbase_workspace/scripts/delete_log/crontab_delete_logfile.sh
0 15 * * * sh /opt/gbase_workspace/scripts/inspection/inspection_gbase.sh
0 16 25 * * sh /opt/gbase_workspace/scripts/inspection/inspection_pro.sh";

const SIMILARITY_THRESHOLD: f64 = 0.85;

/// Scheduled-task rule: the reference crontab is diffed against the observed
/// dump. Exact lines pass; near matches on the command portion become
/// similarity warnings; everything else is missing. The always.sh watchdog
/// gets its own verdict.
pub fn check(conn: &Connection, system: &str, ctx: &mut ReportContext) -> Result<()> {
    let crontab = db::fetch_sys_row(conn, system)?
        .and_then(|s| s.crontab_always)
        .unwrap_or_default();

    println!("=============== 集群定时任务和always脚本诊断 ===============");
    if ALWAYS_RE.is_match(&crontab) {
        println!("✅ always.sh 脚本正在运行");
        ctx.set("ALARM_ALWAYS", "已启动always.sh运维脚本");
    } else {
        println!("⚠️ always.sh 脚本未运行");
        ctx.set("ALARM_ALWAYS", "未启动always.sh运维脚本");
    }

    let text = diff_crontab(REFERENCE_CRONTAB, &crontab, ctx);
    println!("{text}");
    ctx.set("CRON_TTEXT", text);

    // the renderer shows the watchdog entry apart from the ordinary jobs
    let (always_lines, cron_lines): (Vec<&str>, Vec<&str>) = crontab
        .lines()
        .partition(|line| line.contains("always.sh"));
    ctx.set("CRON_RESULT", cron_lines.join("\n"));
    ctx.set("ALWAYS_RESULT", always_lines.join("\n"));
    Ok(())
}

/// The command portion of a crontab line: everything from the first
/// path-like or `sh` token onward.
fn command_path(line: &str) -> String {
    let parts: Vec<&str> = line.split_whitespace().collect();
    for (i, part) in parts.iter().enumerate() {
        if part.starts_with('/') || part.starts_with("sh") {
            return parts[i..].join(" ");
        }
    }
    String::new()
}

fn diff_crontab(reference: &str, actual: &str, ctx: &mut ReportContext) -> String {
    let ref_lines: Vec<&str> = reference
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let actual_lines: Vec<&str> = actual
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut missing: Vec<&str> = Vec::new();
    let mut warnings: Vec<(&str, &str, f64)> = Vec::new();

    for ref_line in &ref_lines {
        if actual_lines.contains(ref_line) {
            continue;
        }

        let ref_cmd = command_path(ref_line);
        let mut best: Option<(&str, f64)> = None;
        for actual_line in &actual_lines {
            let ratio = normalized_levenshtein(&ref_cmd, &command_path(actual_line));
            if best.map_or(true, |(_, b)| ratio > b) {
                best = Some((actual_line, ratio));
            }
        }

        match best {
            Some((line, ratio)) if ratio >= SIMILARITY_THRESHOLD => {
                warnings.push((ref_line, line, ratio));
            }
            _ => missing.push(ref_line),
        }
    }

    let mut out: Vec<String> = Vec::new();
    if !missing.is_empty() {
        ctx.set("ALARM_CRON", "定时任务有缺失");
        out.push("❌ 缺失的定时任务（完全未找到）：".to_string());
        for line in &missing {
            out.push(format!("  MISSING: {line}"));
        }
    }
    if !warnings.is_empty() {
        ctx.set("ALARM_CRON", "定时任务有差异");
        out.push("⚠️ 差异告警（存在相似项但不完全一致）：".to_string());
        for (reference, matched, score) in &warnings {
            out.push(format!("  WARNING: {reference}"));
            out.push(format!("           ↳ 相似项: {matched}"));
            out.push(format!("           ↳ 相似度: {score:.2}"));
        }
    }
    if missing.is_empty() && warnings.is_empty() {
        ctx.set("ALARM_CRON", "所有定时任务都完全正常");
        out.push("✅ 所有定时任务都完全匹配，无缺失无差异。".to_string());
    }
    out.join("\n")
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_passes() {
        let mut ctx = ReportContext::default();
        let text = diff_crontab(
            "*/5 * * * * sh /opt/x/monitor.sh",
            "*/5 * * * * sh /opt/x/monitor.sh\n30 1 * * * sh /opt/y/other.sh",
            &mut ctx,
        );
        assert!(text.contains("完全匹配"));
        assert_eq!(ctx.get("ALARM_CRON"), Some("所有定时任务都完全正常"));
    }

    #[test]
    fn near_match_is_similarity_warning() {
        let mut ctx = ReportContext::default();
        let text = diff_crontab(
            "*/5 * * * * sh /opt/gbase_workspace/scripts/monitor/bin/monitor.sh",
            "*/5 * * * * sh /opt/gbase_workspace/scripts/monitor/bin/monitor.sh -q",
            &mut ctx,
        );
        assert!(text.contains("WARNING"));
        assert!(!text.contains("MISSING"));
        assert_eq!(ctx.get("ALARM_CRON"), Some("定时任务有差异"));
    }

    #[test]
    fn unrelated_lines_are_missing() {
        let mut ctx = ReportContext::default();
        let text = diff_crontab(
            "*/5 * * * * sh /opt/x/monitor.sh",
            "0 3 * * * /usr/bin/backup --all",
            &mut ctx,
        );
        assert!(text.contains("MISSING"));
        assert_eq!(ctx.get("ALARM_CRON"), Some("定时任务有缺失"));
    }

    #[test]
    fn empty_dump_reports_everything_missing() {
        let mut ctx = ReportContext::default();
        let text = diff_crontab(REFERENCE_CRONTAB, "", &mut ctx);
        assert_eq!(text.matches("MISSING").count(), 6);
    }

    #[test]
    fn command_portion_extraction() {
        assert_eq!(
            command_path("*/5 * * * * sh /opt/x/monitor.sh"),
            "sh /opt/x/monitor.sh"
        );
        assert_eq!(
            command_path("0 3 * * * /usr/bin/backup --all"),
            "/usr/bin/backup --all"
        );
        assert_eq!(command_path("no command here"), "");
    }
}
