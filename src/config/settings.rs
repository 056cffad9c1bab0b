//! Provisioning data: package sets, stacks, dotfile mappings, tuning edits
//!
//! Every field has a built-in default so an empty or partial YAML file is
//! valid. A stack section present in the file replaces the built-in stack
//! field by field; fields it leaves out are empty.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{DeskforgeError, Result};

/// Top-level settings document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Login profile file, relative to the home directory
    pub profile_file: String,
    /// Variables written to the managed `env` block of the profile
    pub exports: BTreeMap<String, String>,
    pub packages: PackageSets,
    pub aur: AurSettings,
    pub build: BuildSettings,
    pub stack_a: StackSettings,
    pub stack_b: StackSettings,
    pub dotfiles: DotfileSettings,
    pub services: ServiceSettings,
    /// Font families expected by `fc-list` after the look phase
    pub fonts: Vec<String>,
    /// In-place line edits applied by the optimize phase
    pub tuning: Vec<LineEdit>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackageSets {
    pub core: Vec<String>,
    pub look: Vec<String>,
    pub apps: Vec<String>,
    /// Installed one by one; a failure is only a warning
    pub optional: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AurSettings {
    /// Helper binary name, e.g. `paru`
    pub helper: String,
    /// AUR git URL the helper is bootstrapped from when missing
    pub helper_url: String,
    pub apps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildSettings {
    /// Install prefix passed to `make install`
    pub prefix: String,
}

/// One of the two alternative desktop stacks
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StackSettings {
    pub label: String,
    pub packages: Vec<String>,
    pub aur: Vec<String>,
    pub components: Vec<BuildComponent>,
    pub files: Vec<FileMapping>,
    pub trees: Vec<TreeMapping>,
    /// Command the session block execs on login
    pub session_command: String,
    /// Executables that must be on PATH once the stack is installed
    pub binaries: Vec<String>,
}

/// A source-built component, mirrored into the cache and installed with make
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildComponent {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub branch: Option<String>,
}

/// Single file from the dotfiles mirror, destination relative to home
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileMapping {
    pub source: String,
    pub dest: String,
    #[serde(default)]
    pub executable: bool,
}

/// Directory from the dotfiles mirror, merged into a directory under home
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreeMapping {
    pub source: String,
    pub dest: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DotfileSettings {
    pub url: String,
    pub branch: Option<String>,
    pub files: Vec<FileMapping>,
    pub trees: Vec<TreeMapping>,
    /// Directory in the mirror whose files are installed into ~/.local/bin
    pub scripts_dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceSettings {
    /// Enabled by the core phase; failure aborts the run
    pub required: Vec<String>,
    /// Enabled by the apps phase; failure is a warning
    pub optional: Vec<String>,
}

/// Replace-or-append edit of one setting line in a system file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineEdit {
    pub file: String,
    /// Regex matching the line(s) holding the setting, commented or not
    pub pattern: String,
    /// Replacement line; `{jobs}` expands to the build parallelism
    pub line: String,
    /// Create the file when missing instead of skipping the edit
    #[serde(default)]
    pub create: bool,
}

impl LineEdit {
    /// Replacement line with placeholders expanded
    pub fn rendered_line(&self, jobs: usize) -> String {
        self.line.replace("{jobs}", &jobs.to_string())
    }
}

impl Settings {
    /// Parse a YAML settings document; `origin` names it in errors
    pub fn from_yaml(text: &str, origin: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| DeskforgeError::ConfigParseFailed {
            path: origin.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn stack(&self, stack: crate::variant::Stack) -> &StackSettings {
        match stack {
            crate::variant::Stack::A => &self.stack_a,
            crate::variant::Stack::B => &self.stack_b,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn file(source: &str, dest: &str) -> FileMapping {
    FileMapping {
        source: source.to_string(),
        dest: dest.to_string(),
        executable: false,
    }
}

fn tree(source: &str, dest: &str) -> TreeMapping {
    TreeMapping {
        source: source.to_string(),
        dest: dest.to_string(),
    }
}

fn suckless(name: &str) -> BuildComponent {
    BuildComponent {
        name: name.to_string(),
        url: format!("https://git.suckless.org/{name}"),
        branch: None,
    }
}

fn edit(file: &str, pattern: &str, line: &str, create: bool) -> LineEdit {
    LineEdit {
        file: file.to_string(),
        pattern: pattern.to_string(),
        line: line.to_string(),
        create,
    }
}

impl Default for Settings {
    fn default() -> Self {
        let mut exports = BTreeMap::new();
        exports.insert("PATH".to_string(), "$HOME/.local/bin:$PATH".to_string());
        exports.insert("EDITOR".to_string(), "nvim".to_string());
        exports.insert("XDG_CONFIG_HOME".to_string(), "$HOME/.config".to_string());

        Self {
            profile_file: ".profile".to_string(),
            exports,
            packages: PackageSets {
                core: strings(&[
                    "base-devel",
                    "git",
                    "curl",
                    "unzip",
                    "zsh",
                    "neovim",
                    "man-db",
                    "openssh",
                    "networkmanager",
                ]),
                look: strings(&[
                    "ttf-jetbrains-mono-nerd",
                    "noto-fonts",
                    "noto-fonts-emoji",
                    "papirus-icon-theme",
                ]),
                apps: strings(&[
                    "firefox", "mpv", "zathura", "zathura-pdf-mupdf", "htop", "ripgrep", "fd",
                ]),
                optional: strings(&["bluez", "bluez-utils", "cups"]),
            },
            aur: AurSettings {
                helper: "paru".to_string(),
                helper_url: "https://aur.archlinux.org/paru-bin.git".to_string(),
                apps: strings(&["brave-bin"]),
            },
            build: BuildSettings {
                prefix: "/usr/local".to_string(),
            },
            stack_a: StackSettings {
                label: "dwm (X11, built from source)".to_string(),
                packages: strings(&[
                    "xorg-server",
                    "xorg-xinit",
                    "xorg-xsetroot",
                    "libx11",
                    "libxft",
                    "libxinerama",
                    "picom",
                    "feh",
                    "dunst",
                ]),
                aur: Vec::new(),
                components: vec![
                    suckless("dwm"),
                    suckless("st"),
                    suckless("dmenu"),
                    suckless("slstatus"),
                ],
                files: vec![file("x11/xinitrc", ".xinitrc")],
                trees: vec![
                    tree("config/dunst", ".config/dunst"),
                    tree("config/picom", ".config/picom"),
                ],
                session_command: "startx".to_string(),
                binaries: strings(&["dwm", "st", "dmenu", "slstatus"]),
            },
            stack_b: StackSettings {
                label: "Hyprland (Wayland)".to_string(),
                packages: strings(&[
                    "hyprland",
                    "xdg-desktop-portal-hyprland",
                    "waybar",
                    "wofi",
                    "kitty",
                    "mako",
                    "swww",
                    "grim",
                    "slurp",
                    "wl-clipboard",
                ]),
                aur: strings(&["hyprshot"]),
                components: Vec::new(),
                files: Vec::new(),
                trees: vec![
                    tree("config/hypr", ".config/hypr"),
                    tree("config/waybar", ".config/waybar"),
                    tree("config/kitty", ".config/kitty"),
                ],
                session_command: "Hyprland".to_string(),
                binaries: strings(&["Hyprland", "waybar", "wofi", "kitty"]),
            },
            dotfiles: DotfileSettings {
                url: "https://github.com/deskforge/dotfiles.git".to_string(),
                branch: Some("main".to_string()),
                files: vec![
                    file("zsh/zshrc", ".zshrc"),
                    file("git/gitconfig", ".gitconfig"),
                ],
                trees: vec![
                    tree("config/nvim", ".config/nvim"),
                    tree("config/zathura", ".config/zathura"),
                ],
                scripts_dir: Some("bin".to_string()),
            },
            services: ServiceSettings {
                required: strings(&["NetworkManager.service"]),
                optional: strings(&["bluetooth.service", "cups.service"]),
            },
            fonts: strings(&["JetBrainsMono Nerd Font", "Noto Color Emoji"]),
            tuning: vec![
                edit(
                    "/etc/sysctl.d/99-deskforge.conf",
                    r"^\s*vm\.swappiness\s*=",
                    "vm.swappiness = 10",
                    true,
                ),
                edit(
                    "/etc/sysctl.d/99-deskforge.conf",
                    r"^\s*vm\.vfs_cache_pressure\s*=",
                    "vm.vfs_cache_pressure = 50",
                    true,
                ),
                edit(
                    "/etc/pacman.conf",
                    r"^#?\s*ParallelDownloads\s*=",
                    "ParallelDownloads = 10",
                    false,
                ),
                edit("/etc/pacman.conf", r"^#?\s*Color\s*$", "Color", false),
                edit(
                    "/etc/makepkg.conf",
                    r"^#?\s*MAKEFLAGS=",
                    "MAKEFLAGS=\"-j{jobs}\"",
                    false,
                ),
                edit(
                    "/etc/systemd/journald.conf",
                    r"^#?\s*SystemMaxUse=",
                    "SystemMaxUse=200M",
                    false,
                ),
            ],
        }
    }
}
