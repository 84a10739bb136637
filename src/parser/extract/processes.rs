use crate::db::ProcessRow;
use crate::parser::lines;
use crate::parser::sections;

/// Coordinator process listings: dashed `-----<ip>-----` blocks of raw
/// `ps -ef` output.
pub fn coor(section: &str, system: &str) -> Vec<ProcessRow> {
    let Some(text) = sections::field(section, "* 管理节点进程状态：") else {
        return Vec::new();
    };
    lines::dashed_ip_lines(&text)
        .into_iter()
        .filter_map(|(ip, line)| {
            let cmd = lines::ps_command(&line)?.to_string();
            Some(ProcessRow {
                system_name: system.to_string(),
                cluster_name: "coor".to_string(),
                ip_address: ip,
                process_cmd: cmd,
            })
        })
        .collect()
}

/// Data-cluster process listings: one `<ip>: <ps -ef line>` per line.
pub fn data(section: &str, system: &str, vc: &str) -> Vec<ProcessRow> {
    let Some(text) = sections::field(section, "* Data Cluster 进程状态:") else {
        return Vec::new();
    };
    lines::ip_ps_rows(&text)
        .into_iter()
        .map(|(ip, cmd)| ProcessRow {
            system_name: system.to_string(),
            cluster_name: vc.to_string(),
            ip_address: ip,
            process_cmd: cmd,
        })
        .collect()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coor_dashed_blocks() {
        let section = "\
* 管理节点进程状态：
-----10.0.0.1-----
gbase 1234 1 0 Jan01 ? 00:10:00 /opt/gcluster/server/bin/gclusterd
gbase 1235 1 0 Jan01 ? 00:00:01 /opt/gcluster/server/bin/gcmonit
not a ps line
* 管理节点日志大小：
ignored";
        let rows = coor(section, "SYS-A");
        assert_eq!(rows.len(), 2);
        assert!(rows[0].process_cmd.ends_with("gclusterd"));
        assert_eq!(rows[1].ip_address, "10.0.0.1");
    }

    #[test]
    fn data_linewise() {
        let section = "\
* Data Cluster 进程状态:
vc1 10.0.0.2: gbase 999 1 0 Jan01 ? 00:00:00 /opt/gnode/server/bin/gbased
vc1 10.0.0.2: short
* Data Cluster 日志情况:
ignored";
        let rows = data(section, "SYS-A", "vc1");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cluster_name, "vc1");
        assert_eq!(rows[0].process_cmd, "/opt/gnode/server/bin/gbased");
    }

    #[test]
    fn missing_field_is_empty() {
        assert!(coor("no processes", "SYS-A").is_empty());
    }
}
