use std::ops::{Index, IndexMut};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Platform {
    VMware,
    HyperV,
    NutanixAhv,
    NutanixEsxi,
    Aws,
    Azure,
    Proxmox,
}

impl Platform {
    /// Tab order.
    pub const ALL: [Platform; 7] = [
        Platform::VMware,
        Platform::HyperV,
        Platform::NutanixAhv,
        Platform::NutanixEsxi,
        Platform::Aws,
        Platform::Azure,
        Platform::Proxmox,
    ];

    pub fn index(self) -> usize {
        match self {
            Platform::VMware => 0,
            Platform::HyperV => 1,
            Platform::NutanixAhv => 2,
            Platform::NutanixEsxi => 3,
            Platform::Aws => 4,
            Platform::Azure => 5,
            Platform::Proxmox => 6,
        }
    }

    pub fn from_index(idx: usize) -> Option<Platform> {
        Self::ALL.get(idx).copied()
    }

    pub fn next(self) -> Platform {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Platform {
        let len = Self::ALL.len();
        Self::ALL[(self.index() + len - 1) % len]
    }

    pub fn from_slug(raw: &str) -> Option<Platform> {
        let needle = raw.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.slug().eq_ignore_ascii_case(needle))
    }

    pub fn sheet_path(self) -> &'static str {
        match self {
            Platform::VMware => "/Sizing-VMWare.xlsx",
            Platform::HyperV => "/Sizing-hyperv.xlsx",
            Platform::NutanixAhv => "/Sizing-Nutanix-AHV.xlsx",
            Platform::NutanixEsxi => "/Sizing-Nutanix-ESXi.xlsx",
            Platform::Aws => "/Sizing-AWS.xlsx",
            Platform::Azure => "/Sizing-Azure.xlsx",
            Platform::Proxmox => "/Sizing-Proxmox.xlsx",
        }
    }

    pub fn notes_path(self) -> &'static str {
        match self {
            Platform::VMware => "/notes-vmware.txt",
            Platform::HyperV => "/notes-hyperv.txt",
            Platform::NutanixAhv => "/notes-nutanix-ahv.txt",
            Platform::NutanixEsxi => "/notes-nutanix-esxi.txt",
            Platform::Aws => "/notes-aws.txt",
            Platform::Azure => "/notes-azure.txt",
            Platform::Proxmox => "/notes-proxmox.txt",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Platform::VMware => "vmware",
            Platform::HyperV => "hyperv",
            Platform::NutanixAhv => "nutanix-ahv",
            Platform::NutanixEsxi => "nutanix-esxi",
            Platform::Aws => "aws",
            Platform::Azure => "azure",
            Platform::Proxmox => "proxmox",
        }
    }
}

pub fn platform_label(platform: Platform) -> &'static str {
    match platform {
        Platform::VMware => "VMware",
        Platform::HyperV => "Hyper-V",
        Platform::NutanixAhv => "Nutanix AHV",
        Platform::NutanixEsxi => "Nutanix ESXi",
        Platform::Aws => "AWS",
        Platform::Azure => "Azure",
        Platform::Proxmox => "Proxmox",
    }
}

/// Exactly one `T` per platform, for the lifetime of the map.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformMap<T> {
    slots: [T; 7],
}

impl<T> PlatformMap<T> {
    pub fn from_fn(mut f: impl FnMut(Platform) -> T) -> Self {
        Self {
            slots: Platform::ALL.map(&mut f),
        }
    }

    pub fn get(&self, platform: Platform) -> &T {
        &self.slots[platform.index()]
    }

    pub fn get_mut(&mut self, platform: Platform) -> &mut T {
        &mut self.slots[platform.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Platform, &T)> {
        Platform::ALL.iter().copied().zip(self.slots.iter())
    }
}

impl<T: Default> Default for PlatformMap<T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T> Index<Platform> for PlatformMap<T> {
    type Output = T;

    fn index(&self, platform: Platform) -> &T {
        self.get(platform)
    }
}

impl<T> IndexMut<Platform> for PlatformMap<T> {
    fn index_mut(&mut self, platform: Platform) -> &mut T {
        self.get_mut(platform)
    }
}
