//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `coop_portal_core` linkage.
//! - Run one link edit end to end against the in-memory backend.
//! - Keep output deterministic apart from generated IDs.
//!
//! Usage: `coop-portal [config.json]`

use coop_portal_core::{
    ApprovalStatus, EntityKind, EntityRef, Identity, LinkUpdate, MemberStatus, MembershipUpdate,
    MemoryBackend, NewMembership, NewPublishingWork, NewRelease, OwnershipSplit, PortalClient,
    PortalConfig, PortalError, Principal, QueryState, RelationshipGraph, Role,
};
use log::info;
use std::process::ExitCode;

const ADMIN_PRINCIPAL: &str = "aaaaa-aa";
const MEMBER_PRINCIPAL: &str = "rrkah-fqaaa";

fn main() -> ExitCode {
    println!("coop_portal_core ping={}", coop_portal_core::ping());
    println!("coop_portal_core version={}", coop_portal_core::core_version());

    if let Err(message) = init_from_args() {
        eprintln!("config error: {message}");
        return ExitCode::FAILURE;
    }

    match run_demo() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("demo failed: {} ({})", err.user_message(), err);
            ExitCode::FAILURE
        }
    }
}

fn init_from_args() -> Result<(), String> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(());
    };
    let config = PortalConfig::load(&path).map_err(|err| err.to_string())?;
    let active = config.init_logging().map_err(|err| err.to_string())?;
    println!("logging active={active}");
    Ok(())
}

fn run_demo() -> Result<(), PortalError> {
    let store = MemoryBackend::new();
    let admin = Principal::parse(ADMIN_PRINCIPAL)?;
    let member = Principal::parse(MEMBER_PRINCIPAL)?;
    store.seed_role(admin.clone(), Role::Admin);

    let mut admin_client = PortalClient::new(store.as_caller(admin.clone()));
    admin_client.set_identity(Some(Identity::new(admin)))?;

    let mut member_client = PortalClient::new(store.as_caller(member.clone()));
    let access = member_client.set_identity(Some(Identity::new(member)))?;
    println!("member access before approval={access:?}");
    member_client.request_approval()?;
    admin_client.set_approval(MEMBER_PRINCIPAL, ApprovalStatus::Approved)?;
    println!("member access after approval={:?}", member_client.refresh_session()?);

    let profile = member_client.create_membership(&NewMembership {
        id: "member-001".to_string(),
        name: "Ada Lovelace".to_string(),
        email: "ada@example.org".to_string(),
    })?;
    let work = admin_client.create_publishing_work(&NewPublishingWork {
        title: "Blue Hour".to_string(),
        contributors: vec!["Ada Lovelace".to_string()],
        ownership_splits: vec![OwnershipSplit::new("Ada Lovelace", 100)],
        ..NewPublishingWork::default()
    })?;
    let release = admin_client.create_release(&NewRelease {
        title: "First Light".to_string(),
        release_type: "single".to_string(),
        ..NewRelease::default()
    })?;

    let anchor = EntityRef::new(EntityKind::Membership, profile.id.as_str());
    let mut editor = member_client.open_link_editor(&anchor)?;
    editor.toggle(EntityKind::PublishingWork, &work.id)?;
    member_client.submit_links(&mut editor)?;
    info!("event=cli_demo module=cli status=ok anchor={anchor}");

    admin_client.update_membership_profile(&MembershipUpdate {
        id: profile.id.clone(),
        name: profile.name.clone(),
        email: profile.email.clone(),
        status: MemberStatus::Active,
    })?;
    admin_client.add_publishing_work_notes(&work.id, "Registered with the society.")?;

    admin_client.update_links(
        &LinkUpdate::new(EntityRef::new(EntityKind::Release, release.id.as_str()))
            .with_targets(EntityKind::PublishingWork, [work.id.as_str()])
            .with_targets(EntityKind::Membership, [profile.id.as_str()]),
    )?;

    for group in member_client.related_labels(&anchor)? {
        let labels: Vec<&str> = group
            .entries
            .iter()
            .map(|entry| entry.label.as_str())
            .collect();
        println!("{}: [{}]", group.kind.section_label(), labels.join(", "));
    }

    let mut records = Vec::new();
    for kind in EntityKind::ALL {
        if let QueryState::Ready(list) = admin_client.list(kind) {
            records.extend(list.iter().cloned());
        }
    }
    let graph = RelationshipGraph::from_records(&records);
    println!(
        "graph edges={} missing_reverse={}",
        graph.edge_count(),
        graph.missing_reverse_links().len()
    );
    Ok(())
}
