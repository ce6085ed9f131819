//! Application menu model
//!
//! Plain data consumed by the window host. Edit roles are handled natively
//! by the surface; Quit and the Show actions route back through the event
//! loop.

use std::path::PathBuf;

/// Actions a menu item can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Quit,
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    SelectAll,
    RevealWalletsFolder,
    RevealLogsFolder,
    ToggleDevTools,
}

impl MenuAction {
    /// Edit roles are executed by the surface itself; the shell only logs
    /// them.
    pub fn is_edit_role(&self) -> bool {
        matches!(
            self,
            MenuAction::Undo
                | MenuAction::Redo
                | MenuAction::Cut
                | MenuAction::Copy
                | MenuAction::Paste
                | MenuAction::SelectAll
        )
    }
}

/// One activatable menu entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: &'static str,
    pub accelerator: Option<&'static str>,
    pub action: MenuAction,
}

/// A top-level submenu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submenu {
    pub label: &'static str,
    pub items: Vec<MenuItem>,
}

/// The full application menu
pub fn app_menu() -> Vec<Submenu> {
    vec![
        Submenu {
            label: "Wallet Shell",
            items: vec![MenuItem {
                label: "Quit",
                accelerator: Some("Command+Q"),
                action: MenuAction::Quit,
            }],
        },
        Submenu {
            label: "Edit",
            items: vec![
                MenuItem {
                    label: "Undo",
                    accelerator: Some("CmdOrCtrl+Z"),
                    action: MenuAction::Undo,
                },
                MenuItem {
                    label: "Redo",
                    accelerator: Some("Shift+CmdOrCtrl+Z"),
                    action: MenuAction::Redo,
                },
                MenuItem {
                    label: "Cut",
                    accelerator: Some("CmdOrCtrl+X"),
                    action: MenuAction::Cut,
                },
                MenuItem {
                    label: "Copy",
                    accelerator: Some("CmdOrCtrl+C"),
                    action: MenuAction::Copy,
                },
                MenuItem {
                    label: "Paste",
                    accelerator: Some("CmdOrCtrl+V"),
                    action: MenuAction::Paste,
                },
                MenuItem {
                    label: "Select All",
                    accelerator: Some("CmdOrCtrl+A"),
                    action: MenuAction::SelectAll,
                },
            ],
        },
        Submenu {
            label: "Show",
            items: vec![
                MenuItem {
                    label: "Wallets folder",
                    accelerator: None,
                    action: MenuAction::RevealWalletsFolder,
                },
                MenuItem {
                    label: "Logs folder",
                    accelerator: None,
                    action: MenuAction::RevealLogsFolder,
                },
                MenuItem {
                    label: "DevTools",
                    accelerator: Some(if cfg!(target_os = "macos") {
                        "Alt+Command+I"
                    } else {
                        "Ctrl+Shift+I"
                    }),
                    action: MenuAction::ToggleDevTools,
                },
            ],
        },
    ]
}

/// Wallets directory to reveal: the path the daemon reported, or the
/// conventional location under the home directory.
pub fn wallets_folder(reported: Option<&str>) -> PathBuf {
    match reported {
        Some(path) => PathBuf::from(path),
        None => home_fallback("wallets"),
    }
}

/// Logs directory to reveal, derived from the reported wallets path.
pub fn logs_folder(reported: Option<&str>) -> PathBuf {
    match reported {
        // The daemon keeps logs as a sibling of the wallets directory
        Some(path) => PathBuf::from(path.replacen("wallets", "logs", 1)),
        None => home_fallback("logs"),
    }
}

fn home_fallback(leaf: &str) -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".walletd")
        .join(leaf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_has_three_submenus() {
        let menu = app_menu();
        let labels: Vec<_> = menu.iter().map(|s| s.label).collect();
        assert_eq!(labels, vec!["Wallet Shell", "Edit", "Show"]);
    }

    #[test]
    fn test_show_submenu_actions() {
        let menu = app_menu();
        let show = &menu[2];
        let actions: Vec<_> = show.items.iter().map(|i| i.action).collect();
        assert_eq!(
            actions,
            vec![
                MenuAction::RevealWalletsFolder,
                MenuAction::RevealLogsFolder,
                MenuAction::ToggleDevTools,
            ]
        );
    }

    #[test]
    fn test_edit_roles() {
        assert!(MenuAction::Copy.is_edit_role());
        assert!(MenuAction::SelectAll.is_edit_role());
        assert!(!MenuAction::Quit.is_edit_role());
        assert!(!MenuAction::ToggleDevTools.is_edit_role());
    }

    #[test]
    fn test_wallets_folder_prefers_reported_path() {
        let folder = wallets_folder(Some("/data/.walletd/wallets"));
        assert_eq!(folder, PathBuf::from("/data/.walletd/wallets"));
    }

    #[test]
    fn test_wallets_folder_fallback() {
        let folder = wallets_folder(None);
        assert!(folder.ends_with(".walletd/wallets"));
    }

    #[test]
    fn test_logs_folder_derived_from_wallets_path() {
        let folder = logs_folder(Some("/data/.walletd/wallets"));
        assert_eq!(folder, PathBuf::from("/data/.walletd/logs"));
    }

    #[test]
    fn test_logs_folder_replaces_first_occurrence_only() {
        let folder = logs_folder(Some("/wallets/.walletd/wallets"));
        assert_eq!(folder, PathBuf::from("/logs/.walletd/wallets"));
    }

    #[test]
    fn test_logs_folder_fallback() {
        let folder = logs_folder(None);
        assert!(folder.ends_with(".walletd/logs"));
    }
}
