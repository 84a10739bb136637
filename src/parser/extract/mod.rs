pub mod autostart;
pub mod datacluster;
pub mod disks;
pub mod instances;
pub mod logs;
pub mod machines;
pub mod processes;
pub mod system;
pub mod usage;
pub mod variables;

use crate::db::FileExtract;
use crate::parser::sections;

/// Run every extraction pass against one dump. Absent sections simply
/// contribute nothing; a dump with no recognizable anchors yields an
/// extract that only names the system.
pub fn extract_all(text: &str) -> FileExtract {
    let system = sections::system_name(text);
    let mut out = FileExtract {
        system_name: system.clone(),
        ..Default::default()
    };

    if let Some(sect) = sections::coor_machine(text) {
        out.machines
            .extend(machines::extract(sect, &system, "coor", &machines::COOR_LABELS));
        out.usage
            .extend(usage::extract(sect, &system, "coor", &usage::COOR_LABELS));
        out.cluster_disks
            .push(disks::extract(sect, &system, "coor", &disks::COOR_KEYWORDS));
    }

    if let Some(sect) = sections::coor_cluster(text) {
        out.processes.extend(processes::coor(sect, &system));
        out.logs.extend(logs::coor(sect, &system));
        out.autostart.extend(autostart::coor(sect, &system));
        out.instances.extend(instances::coor(sect, &system));
        out.system = Some(system::extract(sect, &system));
    }

    if let Some(block) = sections::coor_variables(text) {
        out.variables
            .extend(variables::extract(block, &system, "coor"));
    }

    for vc in sections::vc_names(text) {
        if let Some(sect) = sections::data_machine(text, &vc) {
            out.machines
                .extend(machines::extract(sect, &system, &vc, &machines::DATA_LABELS));
            out.usage
                .extend(usage::extract(sect, &system, &vc, &usage::DATA_LABELS));
            out.cluster_disks
                .push(disks::extract(sect, &system, &vc, &disks::DATA_KEYWORDS));
        }

        if let Some(sect) = sections::data_cluster(text, &vc) {
            out.processes.extend(processes::data(sect, &system, &vc));
            out.logs.extend(logs::data(sect, &system, &vc));
            out.autostart.extend(autostart::data(sect, &system, &vc));
            out.instances.extend(instances::data(sect, &system, &vc));
            out.data_clusters
                .push(datacluster::extract(sect, &system, &vc));
        }

        if let Some(block) = sections::data_variables(text, &vc) {
            out.variables.extend(variables::extract(block, &system, &vc));
        }
    }

    out
}

// ── Tests ──
