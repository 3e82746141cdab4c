//! In-memory portal data shared by all pages.

use ratatui::style::Color;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Laboratory {
    pub id: u32,
    pub name: String,
    pub building: String,
    pub manager: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrumentStatus {
    Available,
    InUse,
    Maintenance,
}

impl InstrumentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            InstrumentStatus::Available => "空闲",
            InstrumentStatus::InUse => "使用中",
            InstrumentStatus::Maintenance => "维护中",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            InstrumentStatus::Available => Color::Green,
            InstrumentStatus::InUse => Color::Yellow,
            InstrumentStatus::Maintenance => Color::Red,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrument {
    pub code: String,
    pub name: String,
    pub lab_id: u32,
    pub status: InstrumentStatus,
    /// Internal fee per machine hour, in yuan.
    pub hourly_rate: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationStatus {
    Pending,
    Approved,
    Cancelled,
}

impl ReservationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "待审核",
            ReservationStatus::Approved => "已批准",
            ReservationStatus::Cancelled => "已取消",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub id: u32,
    pub instrument_code: String,
    pub applicant: String,
    pub slot: String,
    pub status: ReservationStatus,
}

#[derive(Debug, Clone, Default)]
pub struct PortalData {
    pub laboratories: Vec<Laboratory>,
    pub instruments: Vec<Instrument>,
    pub reservations: Vec<Reservation>,
}

impl PortalData {
    pub fn sample() -> Self {
        let lab = |id, name: &str, building: &str, manager: &str| Laboratory {
            id,
            name: name.into(),
            building: building.into(),
            manager: manager.into(),
        };
        let instrument = |code: &str, name: &str, lab_id, status, hourly_rate| Instrument {
            code: code.into(),
            name: name.into(),
            lab_id,
            status,
            hourly_rate,
        };
        let reservation = |id, code: &str, applicant: &str, slot: &str, status| Reservation {
            id,
            instrument_code: code.into(),
            applicant: applicant.into(),
            slot: slot.into(),
            status,
        };

        Self {
            laboratories: vec![
                lab(1, "分析测试中心", "理科楼 A 座", "王建国"),
                lab(2, "材料表征实验室", "材料楼 3 层", "李晓梅"),
                lab(3, "生命科学仪器平台", "生科楼 B1", "陈志强"),
            ],
            instruments: vec![
                instrument("ICP-MS-01", "电感耦合等离子体质谱仪", 1, InstrumentStatus::Available, 400),
                instrument("NMR-600", "600MHz 核磁共振波谱仪", 1, InstrumentStatus::InUse, 600),
                instrument("SEM-02", "场发射扫描电子显微镜", 2, InstrumentStatus::Available, 350),
                instrument("XRD-01", "X 射线衍射仪", 2, InstrumentStatus::Maintenance, 200),
                instrument("FCM-01", "流式细胞仪", 3, InstrumentStatus::Available, 180),
                instrument("CLSM-01", "激光共聚焦显微镜", 3, InstrumentStatus::InUse, 300),
            ],
            reservations: vec![
                reservation(1, "NMR-600", "张伟", "10-20 09:00-11:00", ReservationStatus::Approved),
                reservation(2, "SEM-02", "刘洋", "10-21 14:00-16:00", ReservationStatus::Pending),
                reservation(3, "FCM-01", "赵敏", "10-22 08:30-10:30", ReservationStatus::Pending),
                reservation(4, "ICP-MS-01", "孙磊", "10-19 13:00-15:00", ReservationStatus::Cancelled),
            ],
        }
    }

    pub fn instruments_in(&self, lab_id: u32) -> impl Iterator<Item = &Instrument> {
        self.instruments.iter().filter(move |i| i.lab_id == lab_id)
    }

    pub fn laboratory(&self, id: u32) -> Option<&Laboratory> {
        self.laboratories.iter().find(|l| l.id == id)
    }

    pub fn instrument(&self, code: &str) -> Option<&Instrument> {
        self.instruments.iter().find(|i| i.code == code)
    }

    pub fn pending_reservations(&self) -> usize {
        self.reservations
            .iter()
            .filter(|r| r.status == ReservationStatus::Pending)
            .count()
    }

    /// Change a reservation's status. Cancelled reservations stay cancelled.
    pub fn set_reservation_status(&mut self, id: u32, status: ReservationStatus) -> bool {
        match self.reservations.iter_mut().find(|r| r.id == id) {
            Some(r) if r.status != ReservationStatus::Cancelled => {
                r.status = status;
                true
            }
            _ => false,
        }
    }
}
