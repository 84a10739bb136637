use crate::db::MachineRow;
use crate::parser::lines;
use crate::parser::merge::IpMerged;
use crate::parser::sections;

/// Field labels differ between the coordinator and data machine blocks.
pub struct Labels {
    pub os: &'static str,
    pub hostname: &'static str,
    pub cpu_model: &'static str,
    pub cpu_logic: &'static str,
    pub cpu_physical: &'static str,
    pub ip_list: &'static str,
}

pub const COOR_LABELS: Labels = Labels {
    os: "* 管理节点操作系统版本：",
    hostname: "* Hostname：",
    cpu_model: "* CPU model name信息:",
    cpu_logic: "* CPU 逻辑核数信息：",
    cpu_physical: "* CPU 物理核数：",
    ip_list: "* 服务器IP地址列表",
};

pub const DATA_LABELS: Labels = Labels {
    os: "* 计算节点操作系统版本：",
    hostname: "* Hostname：",
    cpu_model: "* CPU model name信息:",
    cpu_logic: "* CPU 逻辑核数：",
    cpu_physical: "* CPU 物理核数：",
    ip_list: "* 计算集群IP列表：",
};

#[derive(Default)]
struct Partial {
    tag: Option<String>,
    os: Option<String>,
    hostname: Option<String>,
    cpu_model: Option<String>,
    cpu_logic: Option<String>,
    cpu_physical: Option<String>,
    serverip_list: Option<String>,
}

/// One machine row per distinct IP seen in the block, fields merged across
/// the per-label passes in first-seen IP order.
pub fn extract(section: &str, system: &str, cluster: &str, labels: &Labels) -> Vec<MachineRow> {
    let mut merged: IpMerged<Partial> = IpMerged::new();

    let mut fill = |label: &str, set: &mut dyn FnMut(&mut Partial, lines::TagIpRow)| {
        if let Some(text) = sections::field(section, label) {
            for row in lines::tag_ip_rows(&text) {
                let entry = merged.entry(&row.ip);
                if entry.tag.is_none() {
                    entry.tag = Some(row.tag.clone());
                }
                set(entry, row);
            }
        }
    };

    fill(labels.os, &mut |e, r| e.os = Some(r.value));
    fill(labels.hostname, &mut |e, r| e.hostname = Some(r.value));
    fill(labels.cpu_model, &mut |e, r| e.cpu_model = Some(r.value));
    fill(labels.cpu_logic, &mut |e, r| e.cpu_logic = Some(r.value));
    fill(labels.cpu_physical, &mut |e, r| e.cpu_physical = Some(r.value));

    if let Some(raw) = sections::field(section, labels.ip_list) {
        for ip in lines::listed_ips(&raw) {
            merged.entry(&ip).serverip_list = Some(raw.clone());
        }
    }

    merged
        .into_rows()
        .into_iter()
        .map(|(ip, p)| MachineRow {
            system_name: system.to_string(),
            cluster_name: p.tag.unwrap_or_else(|| cluster.to_string()),
            ip_address: ip,
            os_version: p.os,
            hostname: p.hostname,
            cpu_model_name: p.cpu_model,
            cpu_logic_core: p.cpu_logic,
            cpu_physical_core: p.cpu_physical,
            serverip_list: p.serverip_list,
        })
        .collect()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    const SECTION: &str = "\
* 管理节点操作系统版本：
coor 10.0.0.1: CentOS Linux release 7.9.2009
coor 10.0.0.3: CentOS Linux release 7.9.2009
* Hostname：
coor 10.0.0.1: gc-coor01
coor 10.0.0.3: gc-coor02
* CPU model name信息:
coor 10.0.0.1: model name : Intel(R) Xeon(R) Gold 6240
* CPU 逻辑核数信息：
coor 10.0.0.1: 72
* CPU 物理核数：
coor 10.0.0.1: 36
* 服务器IP地址列表
coor 10.0.0.1: 10.0.0.1 10.0.0.3
* 物理内存使用情况：
coor 10.0.0.1: Mem: 257676 80921 1335 4013 175419 170773";

    #[test]
    fn merges_per_ip() {
        let rows = extract(SECTION, "SYS-A", "coor", &COOR_LABELS);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].ip_address, "10.0.0.1");
        assert_eq!(rows[0].cluster_name, "coor");
        assert_eq!(rows[0].hostname.as_deref(), Some("gc-coor01"));
        assert_eq!(rows[0].cpu_logic_core.as_deref(), Some("72"));
        assert!(rows[0].serverip_list.is_some());
        // second node only appeared in two passes
        assert_eq!(rows[1].hostname.as_deref(), Some("gc-coor02"));
        assert!(rows[1].cpu_model_name.is_none());
    }

    #[test]
    fn missing_fields_give_empty() {
        let rows = extract("no labels here", "SYS-A", "coor", &COOR_LABELS);
        assert!(rows.is_empty());
    }
}
