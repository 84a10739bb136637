use std::sync::LazyLock;

use regex::Regex;

use crate::db::SystemRow;
use crate::parser::lines;
use crate::parser::sections;

static COORDINATOR1_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\| *coordinator1 *\| *([\d.]+) *\|").unwrap());

/// System-level facts from the coordinator cluster block: management-node
/// IP, product version, crontab dump, failover text.
pub fn extract(section: &str, system: &str) -> SystemRow {
    let crontab = sections::field(section, "* 监控运维脚本：").map(trim_trailing_marker);
    let failover = sections::field(section, "* Coor Cluster Failover信息：").map(trim_trailing_marker);

    let version = sections::next_line_values(section, &["GBase版本号"])
        .into_iter()
        .next()
        .filter(|v| !v.is_empty());

    let ma_one_ip = COORDINATOR1_RE
        .captures(&lines::strip_ansi(section))
        .map(|c| c[1].to_string());

    SystemRow {
        system_name: system.to_string(),
        ma_one_ip,
        gbase_version: version,
        failover_info: failover,
        crontab_always: crontab,
    }
}

/// Dumps occasionally end with a lone `*` line left over from the report
/// generator; it is not content.
fn trim_trailing_marker(text: String) -> String {
    text.trim_end()
        .trim_end_matches('*')
        .trim_end()
        .to_string()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    const SECTION: &str = "\
* 监控运维脚本：
*/5 * * * * sh /opt/gbase_workspace/scripts/monitor/bin/monitor.sh
sh always.sh
* Coor Cluster拓扑及状态：
| coordinator1 | 10.0.0.1 | OPEN | 0 |
* Coor Cluster Failover信息：
no failover events
* GBase版本号：
9.5.3.28";

    #[test]
    fn system_facts() {
        let row = extract(SECTION, "SYS-A");
        assert_eq!(row.ma_one_ip.as_deref(), Some("10.0.0.1"));
        assert_eq!(row.gbase_version.as_deref(), Some("9.5.3.28"));
        assert!(row.crontab_always.unwrap().contains("monitor.sh"));
        assert_eq!(row.failover_info.as_deref(), Some("no failover events"));
    }

    #[test]
    fn trailing_marker_trimmed() {
        assert_eq!(trim_trailing_marker("text\n*".into()), "text");
        assert_eq!(trim_trailing_marker("text".into()), "text");
    }
}
