//! Permissions on tags and namespaces
//!
//! Fluidinfo keeps one permission (a policy plus a list of exceptions) per
//! action on each entity. This module reads and writes them, summarises them
//! as `ls -l` style strings and applies the named presets of `fdb perms`.

use std::fmt;

use clap::ValueEnum;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::status;
use crate::error::{CliError, Result};
use crate::fluiddb::FluidDb;

/// Kinds of entity that carry permissions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    /// The tag itself (`/permissions/tags`)
    AbstractTag,
    /// Values of the tag on objects (`/permissions/tag-values`)
    Tag,
    /// A namespace (`/permissions/namespaces`)
    Namespace,
}

impl Entity {
    /// Resource collection under `/permissions`
    #[must_use]
    pub const fn resource(self) -> &'static str {
        match self {
            Self::AbstractTag => "tags",
            Self::Tag => "tag-values",
            Self::Namespace => "namespaces",
        }
    }

    /// API actions paired with the short names used in listings
    #[must_use]
    pub const fn actions(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::AbstractTag => &[
                ("update", "metadata"),
                ("delete", "delete"),
                ("control", "acontrol"),
            ],
            Self::Tag => &[
                ("create", "tag"),
                ("read", "read"),
                ("delete", "untag"),
                ("control", "tcontrol"),
            ],
            Self::Namespace => &[
                ("create", "create"),
                ("update", "metadata"),
                ("delete", "delete"),
                ("list", "read"),
                ("control", "control"),
            ],
        }
    }

    fn check_action(self, action: &str) -> Result<()> {
        if self.actions().iter().any(|(a, _)| *a == action) {
            Ok(())
        } else {
            Err(CliError::InvalidArgument(format!(
                "{action} is not an action on /permissions/{}",
                self.resource()
            )))
        }
    }
}

/// Whether an action is open or closed by default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// Everyone except the exceptions
    Open,
    /// Nobody except the exceptions
    Closed,
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Open => "open",
            Self::Closed => "closed",
        })
    }
}

/// Policy and exceptions for one action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Default for users not listed
    pub policy: Policy,
    /// Users treated the opposite way to the policy
    pub exceptions: Vec<String>,
}

impl Permission {
    /// Closed to all but `exceptions`
    pub fn closed(exceptions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            policy: Policy::Closed,
            exceptions: exceptions.into_iter().map(Into::into).collect(),
        }
    }

    /// Open to all but `exceptions`
    pub fn open(exceptions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            policy: Policy::Open,
            exceptions: exceptions.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `user` may perform the action
    #[must_use]
    pub fn allows(&self, user: &str) -> bool {
        let listed = self.exceptions.iter().any(|e| e == user);
        match self.policy {
            Policy::Open => !listed,
            Policy::Closed => listed,
        }
    }

    fn owner_flag(&self, code: char, owner: &str) -> char {
        if self.policy == Policy::Open || self.exceptions.iter().any(|e| e == owner) {
            code
        } else {
            '-'
        }
    }

    fn world_flag(&self, code: char) -> char {
        if self.policy == Policy::Open {
            code
        } else {
            '-'
        }
    }

    /// Flag for users other than the owner named in the exceptions
    fn group_flag(&self, code: char, owner: &str) -> char {
        let others = self.exceptions.iter().filter(|e| *e != owner).count();
        match (self.policy, others > 0) {
            (Policy::Closed, true) | (Policy::Open, false) => code,
            _ => '-',
        }
    }

    fn describe(&self) -> String {
        format!(
            "policy: {}; exceptions [{}]",
            self.policy,
            self.exceptions.join(", ")
        )
    }
}

/// All permissions on a tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPerms {
    /// Update the tag's description
    pub metadata: Permission,
    /// Delete the tag
    pub delete: Permission,
    /// Change the tag's permissions
    pub acontrol: Permission,
    /// Put the tag on objects
    pub tag: Permission,
    /// Read the tag's values
    pub read: Permission,
    /// Remove the tag from objects
    pub untag: Permission,
    /// Change the tag-value permissions
    pub tcontrol: Permission,
}

/// All permissions on a namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespacePerms {
    /// Create namespaces and tags inside
    pub create: Permission,
    /// Update the description
    pub metadata: Permission,
    /// Delete the namespace
    pub delete: Permission,
    /// List the contents
    pub read: Permission,
    /// Change the permissions
    pub control: Permission,
}

/// `w` when every write is allowed, `-` when none is, `.` when mixed
fn write_flag(writes: &[bool]) -> char {
    match writes.iter().filter(|allowed| **allowed).count() {
        n if n == writes.len() => 'w',
        0 => '-',
        _ => '.',
    }
}

/// The shared flag, or `/` when the flags disagree
fn combined_flag(flags: &[char]) -> char {
    match flags.split_first() {
        Some((first, rest)) if rest.iter().all(|f| f == first) => *first,
        Some(_) => '/',
        None => '-',
    }
}

impl TagPerms {
    fn writes(&self) -> [&Permission; 4] {
        [&self.metadata, &self.delete, &self.tag, &self.untag]
    }

    /// Ten-character summary: `t` then owner, group and world `rwc` flags
    #[must_use]
    pub fn summary(&self, owner: &str) -> String {
        let writes = self.writes();
        let controls = [&self.tcontrol, &self.acontrol];
        let owner_writes: Vec<bool> = writes
            .iter()
            .map(|w| w.owner_flag('w', owner) == 'w')
            .collect();
        let world_writes: Vec<bool> = writes.iter().map(|w| w.policy == Policy::Open).collect();

        let flags = [
            self.read.owner_flag('r', owner),
            write_flag(&owner_writes),
            combined_flag(&controls.map(|c| c.owner_flag('c', owner))),
            self.read.group_flag('r', owner),
            combined_flag(&writes.map(|w| w.group_flag('w', owner))),
            combined_flag(&[self.acontrol.group_flag('c', owner), self.tcontrol.group_flag('c', owner)]),
            self.read.world_flag('r'),
            write_flag(&world_writes),
            combined_flag(&controls.map(|c| c.world_flag('c'))),
        ];
        std::iter::once('t').chain(flags).collect()
    }

    /// Every action with its policy and exceptions
    #[must_use]
    pub fn long_description(&self) -> String {
        let mut lines = vec!["ABSTRACT TAG (/tags)".to_string(), "  Write".to_string()];
        lines.push(perm_line("update (metadata):", &self.metadata));
        lines.push(perm_line("delete (delete):", &self.delete));
        lines.push("  Control".to_string());
        lines.push(perm_line("control (control):", &self.acontrol));
        lines.push(String::new());
        lines.push("TAG (/tag-values)".to_string());
        lines.push("  Read".to_string());
        lines.push(perm_line("read (read):", &self.read));
        lines.push("  Write".to_string());
        lines.push(perm_line("create (tag):", &self.tag));
        lines.push(perm_line("delete (untag):", &self.untag));
        lines.push("  Control".to_string());
        lines.push(perm_line("control (control):", &self.tcontrol));
        lines.push(String::new());
        lines.join("\n")
    }

    fn all(&self) -> [&Permission; 7] {
        [
            &self.metadata,
            &self.delete,
            &self.acontrol,
            &self.tag,
            &self.read,
            &self.untag,
            &self.tcontrol,
        ]
    }
}

impl NamespacePerms {
    fn writes(&self) -> [&Permission; 3] {
        [&self.create, &self.metadata, &self.delete]
    }

    /// Ten-character summary: `n` then owner, group and world `rwc` flags
    #[must_use]
    pub fn summary(&self, owner: &str) -> String {
        let writes = self.writes();
        let owner_writes: Vec<bool> = writes
            .iter()
            .map(|w| w.owner_flag('w', owner) == 'w')
            .collect();
        let world_writes: Vec<bool> = writes.iter().map(|w| w.policy == Policy::Open).collect();

        let flags = [
            self.read.owner_flag('r', owner),
            write_flag(&owner_writes),
            self.control.owner_flag('c', owner),
            self.read.group_flag('r', owner),
            combined_flag(&writes.map(|w| w.group_flag('w', owner))),
            self.control.group_flag('c', owner),
            self.read.world_flag('r'),
            write_flag(&world_writes),
            self.control.world_flag('c'),
        ];
        std::iter::once('n').chain(flags).collect()
    }

    /// Every action with its policy and exceptions
    #[must_use]
    pub fn long_description(&self) -> String {
        [
            "NAMESPACE (/namespaces)".to_string(),
            "  Read".to_string(),
            perm_line("list (read):", &self.read),
            "  Write".to_string(),
            perm_line("create (create):", &self.create),
            perm_line("update (metadata):", &self.metadata),
            perm_line("delete (delete):", &self.delete),
            "  Control".to_string(),
            perm_line("control (control):", &self.control),
            String::new(),
        ]
        .join("\n")
    }

    fn all(&self) -> [&Permission; 5] {
        [
            &self.create,
            &self.metadata,
            &self.delete,
            &self.read,
            &self.control,
        ]
    }
}

fn perm_line(label: &str, perm: &Permission) -> String {
    format!("    {label:<18}  {}", perm.describe())
}

/// Users other than `owner` named in any exception list, sorted
#[must_use]
pub fn group_members<'a>(perms: impl IntoIterator<Item = &'a Permission>, owner: &str) -> Vec<String> {
    let mut members: Vec<String> = perms
        .into_iter()
        .flat_map(|p| p.exceptions.iter())
        .filter(|user| *user != owner)
        .cloned()
        .collect();
    members.sort();
    members.dedup();
    members
}

/// Named permission settings for `fdb perms`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// Only the owner may read, write or control
    Private,
    /// Anyone may read; only the owner may write or control
    Default,
    /// Nobody may write (the owner may still unlock)
    Lock,
    /// Only the owner may write
    Unlock,
    /// The owner and the group may read and write
    Group,
    /// The owner and the group may read; only the owner may write
    GroupRead,
    /// The owner and the group may write; reading is unchanged
    GroupWrite,
}

/// Permissions a preset assigns per kind of action; `None` leaves it alone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermPlan {
    /// Reading values or listing
    pub read: Option<Permission>,
    /// Every write action
    pub write: Option<Permission>,
    /// Changing permissions
    pub control: Option<Permission>,
}

impl Preset {
    /// Whether the preset needs a list of group members
    #[must_use]
    pub const fn needs_group(self) -> bool {
        matches!(self, Self::Group | Self::GroupRead | Self::GroupWrite)
    }

    /// Permissions this preset sets for `owner` and `group`
    #[must_use]
    pub fn plan(self, owner: &str, group: &[String]) -> PermPlan {
        let owner_only = || Permission::closed([owner]);
        let with_group = || {
            let mut members = vec![owner.to_string()];
            members.extend(group.iter().filter(|u| *u != owner).cloned());
            Permission::closed(members)
        };
        match self {
            Self::Private => PermPlan {
                read: Some(owner_only()),
                write: Some(owner_only()),
                control: Some(owner_only()),
            },
            Self::Default => PermPlan {
                read: Some(Permission::open(Vec::<String>::new())),
                write: Some(owner_only()),
                control: Some(owner_only()),
            },
            Self::Lock => PermPlan {
                read: None,
                write: Some(Permission::closed(Vec::<String>::new())),
                control: None,
            },
            Self::Unlock => PermPlan {
                read: None,
                write: Some(owner_only()),
                control: None,
            },
            Self::Group => PermPlan {
                read: Some(with_group()),
                write: Some(with_group()),
                control: None,
            },
            Self::GroupRead => PermPlan {
                read: Some(with_group()),
                write: Some(owner_only()),
                control: None,
            },
            Self::GroupWrite => PermPlan {
                read: None,
                write: Some(with_group()),
                control: None,
            },
        }
    }
}

/// Which plan slot each (entity, action) belongs to
fn slot(entity: Entity, action: &str) -> Slot {
    match (entity, action) {
        (Entity::Tag, "read") | (Entity::Namespace, "list") => Slot::Read,
        (_, "control") => Slot::Control,
        _ => Slot::Write,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Read,
    Write,
    Control,
}

impl PermPlan {
    fn get(&self, slot: Slot) -> Option<&Permission> {
        match slot {
            Slot::Read => self.read.as_ref(),
            Slot::Write => self.write.as_ref(),
            Slot::Control => self.control.as_ref(),
        }
    }
}

fn owner_of(path: &str) -> &str {
    path.trim_start_matches('/').split('/').next().unwrap_or_default()
}

/// Permission reads and writes against the server
impl FluidDb {
    /// Permission for one action on an entity
    pub fn get_raw_perm(&self, entity: Entity, path: &str, action: &str) -> Result<Permission> {
        entity.check_action(action)?;
        let resource = self.perm_resource(entity, path);
        let response = self
            .client()
            .call(
                Method::GET,
                &resource,
                None,
                &[("action".to_string(), action.to_string())],
            )?
            .expect_status(status::OK, format!("{action} permission on {path}"))?;
        let body = response.json().cloned().ok_or_else(|| {
            CliError::InvalidResponse(format!("permission {resource}: {}", response.body))
        })?;
        Ok(serde_json::from_value(body)?)
    }

    /// Replace the permission for one action on an entity
    pub fn set_raw_perm(
        &self,
        entity: Entity,
        path: &str,
        action: &str,
        perm: &Permission,
    ) -> Result<()> {
        entity.check_action(action)?;
        let resource = self.perm_resource(entity, path);
        let body = serde_json::to_value(perm)?;
        self.client()
            .call(
                Method::PUT,
                &resource,
                Some(&body),
                &[("action".to_string(), action.to_string())],
            )?
            .expect_status(status::NO_CONTENT, format!("setting {action} permission on {path}"))?;
        info!(%path, %action, policy = %perm.policy, exceptions = ?perm.exceptions, "set permission");
        Ok(())
    }

    fn perm_resource(&self, entity: Entity, path: &str) -> String {
        format!("/permissions/{}{}", entity.resource(), self.paths().absolute(path))
    }

    /// Every permission on a tag
    pub fn tag_perms(&self, tag: &str) -> Result<TagPerms> {
        let abs = |action| self.get_raw_perm(Entity::AbstractTag, tag, action);
        let val = |action| self.get_raw_perm(Entity::Tag, tag, action);
        Ok(TagPerms {
            metadata: abs("update")?,
            delete: abs("delete")?,
            acontrol: abs("control")?,
            tag: val("create")?,
            read: val("read")?,
            untag: val("delete")?,
            tcontrol: val("control")?,
        })
    }

    /// Every permission on a namespace
    pub fn namespace_perms(&self, namespace: &str) -> Result<NamespacePerms> {
        let get = |action| self.get_raw_perm(Entity::Namespace, namespace, action);
        Ok(NamespacePerms {
            create: get("create")?,
            metadata: get("update")?,
            delete: get("delete")?,
            read: get("list")?,
            control: get("control")?,
        })
    }

    /// `t.........` summary of a tag's permissions
    pub fn tag_perms_string(&self, tag: &str) -> Result<String> {
        Ok(self.tag_perms(tag)?.summary(owner_of(&self.paths().absolute(tag))))
    }

    /// `n.........` summary of a namespace's permissions
    pub fn ns_perms_string(&self, namespace: &str) -> Result<String> {
        Ok(self
            .namespace_perms(namespace)?
            .summary(owner_of(&self.paths().absolute(namespace))))
    }

    /// Group members (exceptions other than the owner) on a tag or namespace
    pub fn perms_group(&self, path: &str, is_namespace: bool) -> Result<Vec<String>> {
        let absolute = self.paths().absolute(path);
        let owner = owner_of(&absolute);
        Ok(if is_namespace {
            group_members(self.namespace_perms(path)?.all(), owner)
        } else {
            group_members(self.tag_perms(path)?.all(), owner)
        })
    }

    /// Long description of a tag's or namespace's permissions
    pub fn perms_long_description(&self, path: &str, is_namespace: bool) -> Result<String> {
        Ok(if is_namespace {
            self.namespace_perms(path)?.long_description()
        } else {
            self.tag_perms(path)?.long_description()
        })
    }

    /// Apply a preset to a tag or namespace
    pub fn apply_preset(
        &self,
        path: &str,
        is_namespace: bool,
        preset: Preset,
        group: &[String],
    ) -> Result<()> {
        if preset.needs_group() && group.is_empty() {
            return Err(CliError::MissingArgument(
                "group members (--group) for this preset".to_string(),
            ));
        }
        let absolute = self.paths().absolute(path);
        let plan = preset.plan(owner_of(&absolute), group);
        let entities: &[Entity] = if is_namespace {
            &[Entity::Namespace]
        } else {
            &[Entity::AbstractTag, Entity::Tag]
        };
        for &entity in entities {
            for (action, _) in entity.actions() {
                if let Some(perm) = plan.get(slot(entity, action)) {
                    self.set_raw_perm(entity, &absolute, action, perm)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open() -> Permission {
        Permission::open(Vec::<String>::new())
    }

    fn owner() -> Permission {
        Permission::closed(["njr"])
    }

    fn default_tag() -> TagPerms {
        TagPerms {
            metadata: owner(),
            delete: owner(),
            acontrol: owner(),
            tag: owner(),
            read: open(),
            untag: owner(),
            tcontrol: owner(),
        }
    }

    #[test]
    fn default_tag_summary() {
        assert_eq!(default_tag().summary("njr"), "trwcr--r--");
    }

    #[test]
    fn private_tag_summary() {
        let mut perms = default_tag();
        perms.read = owner();
        assert_eq!(perms.summary("njr"), "trwc------");
    }

    #[test]
    fn mixed_writes_show_dot() {
        let mut perms = default_tag();
        perms.delete = Permission::closed(Vec::<String>::new());
        assert_eq!(&perms.summary("njr")[..3], "tr.");
    }

    #[test]
    fn disagreeing_controls_show_slash() {
        let mut perms = default_tag();
        perms.tcontrol = open();
        let summary = perms.summary("njr");
        assert_eq!(summary.chars().nth(9), Some('/'));
    }

    #[test]
    fn group_flags() {
        let mut perms = default_tag();
        perms.read = Permission::closed(["njr", "alice"]);
        assert_eq!(perms.summary("njr"), "trwcr-----");
        assert_eq!(group_members(perms.all(), "njr"), vec!["alice"]);
    }

    #[test]
    fn namespace_summary() {
        let perms = NamespacePerms {
            create: owner(),
            metadata: owner(),
            delete: owner(),
            read: open(),
            control: owner(),
        };
        assert_eq!(perms.summary("njr"), "nrwcr--r--");
    }

    #[test]
    fn long_description_lists_every_action() {
        let text = default_tag().long_description();
        assert!(text.contains("    read (read):        policy: open; exceptions []"));
        assert!(text.contains("    create (tag):       policy: closed; exceptions [njr]"));
        assert_eq!(text.matches("policy:").count(), 7);
    }

    #[test]
    fn permission_allows() {
        assert!(open().allows("anyone"));
        assert!(owner().allows("njr"));
        assert!(!owner().allows("alice"));
    }

    #[test]
    fn presets() {
        let plan = Preset::Lock.plan("njr", &[]);
        assert_eq!(plan.write, Some(Permission::closed(Vec::<String>::new())));
        assert_eq!(plan.read, None);

        let group = vec!["alice".to_string(), "njr".to_string()];
        let plan = Preset::Group.plan("njr", &group);
        assert_eq!(plan.read, Some(Permission::closed(["njr", "alice"])));
        assert!(Preset::GroupWrite.needs_group());
        assert!(!Preset::Private.needs_group());
    }

    #[test]
    fn actions_are_classified() {
        assert_eq!(slot(Entity::Tag, "read"), Slot::Read);
        assert_eq!(slot(Entity::Namespace, "list"), Slot::Read);
        assert_eq!(slot(Entity::AbstractTag, "control"), Slot::Control);
        assert_eq!(slot(Entity::Namespace, "create"), Slot::Write);
        assert!(Entity::Tag.check_action("update").is_err());
    }
}
