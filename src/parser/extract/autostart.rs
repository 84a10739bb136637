use crate::db::AutoStartRow;
use crate::parser::lines;
use crate::parser::sections;

/// Coordinator autostart dump: dashed IP blocks, one startup command per
/// line.
pub fn coor(section: &str, system: &str) -> Vec<AutoStartRow> {
    let Some(text) = sections::field(section, "* 自启动设置：") else {
        return Vec::new();
    };
    lines::dashed_ip_lines(&text)
        .into_iter()
        .map(|(ip, line)| AutoStartRow {
            system_name: system.to_string(),
            cluster_name: "coor".to_string(),
            ip_address: ip,
            process_start: line,
        })
        .collect()
}

/// Data-cluster autostart dump: `<ip>: <command>` lines.
pub fn data(section: &str, system: &str, vc: &str) -> Vec<AutoStartRow> {
    let Some(text) = sections::field(section, "* Data Cluster 自启动：") else {
        return Vec::new();
    };
    lines::ip_command_rows(&text)
        .into_iter()
        .map(|(ip, cmd)| AutoStartRow {
            system_name: system.to_string(),
            cluster_name: vc.to_string(),
            ip_address: ip,
            process_start: cmd,
        })
        .collect()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coor_blocks() {
        let section = "\
* 自启动设置：
-----10.0.0.1-----
/etc/rc.d/init.d/gcware_services start
/etc/rc.d/init.d/gcluster_services start
* 监控运维脚本：
ignored";
        let rows = coor(section, "SYS-A");
        assert_eq!(rows.len(), 2);
        assert!(rows[0].process_start.contains("gcware_services"));
    }

    #[test]
    fn data_linewise() {
        let section = "* Data Cluster 自启动：\nvc1 10.0.0.2: /etc/rc.d/init.d/gcluster_services start";
        let rows = data(section, "SYS-A", "vc1");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ip_address, "10.0.0.2");
    }
}
