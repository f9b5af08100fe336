//! Universities, periods, disciplines, materials and subscribers managed from
//! the admin dashboard.

use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::PipelineError;
use crate::models::{
    Discipline, DisciplineCounters, Material, NewDiscipline, NewMaterial, NewPeriod, NewSubscriber, Period,
    Subscriber, University,
};

pub const DEFAULT_COURSE: &str = "Medicina";

pub trait CatalogRepository: Send + Sync {
    fn list_universities(&self) -> Vec<University>;
    fn add_university(&self, name: &str) -> Result<University, PipelineError>;
    fn list_periods(&self, university_id: Option<&str>) -> Vec<Period>;
    fn add_period(&self, new: NewPeriod) -> Result<Period, PipelineError>;
    fn list_disciplines(&self, university_id: Option<&str>, period_id: Option<&str>) -> Vec<Discipline>;
    fn add_discipline(&self, new: NewDiscipline) -> Result<Discipline, PipelineError>;
    fn list_materials(&self, discipline_id: Option<&str>) -> Vec<Material>;
    /// Stores the material and bumps its discipline's category counter.
    fn add_material(&self, new: NewMaterial) -> Result<Material, PipelineError>;
    fn list_subscribers(&self) -> Vec<Subscriber>;
    fn add_subscriber(&self, new: NewSubscriber) -> Result<Subscriber, PipelineError>;
}

#[derive(Debug, Default)]
struct CatalogState {
    universities: Vec<University>,
    periods: Vec<Period>,
    disciplines: Vec<Discipline>,
    materials: Vec<Material>,
    subscribers: Vec<Subscriber>,
}

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    state: RwLock<CatalogState>,
}

fn new_id(prefix: &str) -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}", &raw[..12])
}

fn required(value: &str, field: &str) -> Result<String, PipelineError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(PipelineError::Validation(format!("{field} é obrigatório")));
    }
    Ok(v.to_string())
}

const DEMO_DISCIPLINES: [&str; 9] = [
    "Bases Científicas da Medicina",
    "Integração dos Sistemas de Saúde",
    "Microbiologia",
    "Imunologia",
    "Patologia Geral",
    "Farmacologia Geral",
    "Introdução Às Técnicas Cirúrgicas",
    "Atividades Integrativas e Ativas Eixo IIA",
    "Atividades Práticas Interdisciplinares de Extensão II",
];

impl InMemoryCatalog {
    pub fn new() -> Self { Self::default() }

    /// Catalog preloaded with the demo university, its 3rd period and the
    /// period's disciplines.
    pub fn with_demo_data() -> Self {
        let university = University { id: "uninassau-teresina".into(), name: "Uninassau Medicina Teresina".into() };
        let period = Period { id: "3-periodo".into(), name: "3º período".into(), university_id: university.id.clone() };
        let disciplines = DEMO_DISCIPLINES
            .iter()
            .enumerate()
            .map(|(i, name)| Discipline {
                id: format!("disc-{}", i + 1),
                name: name.to_string(),
                course: DEFAULT_COURSE.into(),
                period_id: period.id.clone(),
                university_id: university.id.clone(),
                counters: DisciplineCounters::default(),
            })
            .collect();
        let state = CatalogState {
            universities: vec![university],
            periods: vec![period],
            disciplines,
            ..Default::default()
        };
        Self { state: RwLock::new(state) }
    }
}

fn ensure_parents(state: &CatalogState, university_id: &str, period_id: Option<&str>) -> Result<(), PipelineError> {
    if !state.universities.iter().any(|u| u.id == university_id) {
        return Err(PipelineError::NotFound(format!("Universidade não encontrada: {university_id}")));
    }
    if let Some(pid) = period_id {
        if !state.periods.iter().any(|p| p.id == pid && p.university_id == university_id) {
            return Err(PipelineError::NotFound(format!("Período não encontrado: {pid}")));
        }
    }
    Ok(())
}

impl CatalogRepository for InMemoryCatalog {
    fn list_universities(&self) -> Vec<University> {
        self.state.read().universities.clone()
    }

    fn add_university(&self, name: &str) -> Result<University, PipelineError> {
        let uni = University { id: new_id("uni"), name: required(name, "name")? };
        self.state.write().universities.push(uni.clone());
        Ok(uni)
    }

    fn list_periods(&self, university_id: Option<&str>) -> Vec<Period> {
        self.state
            .read()
            .periods
            .iter()
            .filter(|p| university_id.map_or(true, |u| p.university_id == u))
            .cloned()
            .collect()
    }

    fn add_period(&self, new: NewPeriod) -> Result<Period, PipelineError> {
        let name = required(&new.name, "name")?;
        let mut state = self.state.write();
        ensure_parents(&state, &new.university_id, None)?;
        let period = Period { id: new_id("per"), name, university_id: new.university_id };
        state.periods.push(period.clone());
        Ok(period)
    }

    fn list_disciplines(&self, university_id: Option<&str>, period_id: Option<&str>) -> Vec<Discipline> {
        self.state
            .read()
            .disciplines
            .iter()
            .filter(|d| university_id.map_or(true, |u| d.university_id == u))
            .filter(|d| period_id.map_or(true, |p| d.period_id == p))
            .cloned()
            .collect()
    }

    fn add_discipline(&self, new: NewDiscipline) -> Result<Discipline, PipelineError> {
        let name = required(&new.name, "name")?;
        let mut state = self.state.write();
        ensure_parents(&state, &new.university_id, Some(&new.period_id))?;
        let course = new
            .course
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_COURSE.to_string());
        let disc = Discipline {
            id: new_id("disc"),
            name,
            course,
            period_id: new.period_id,
            university_id: new.university_id,
            counters: DisciplineCounters::default(),
        };
        state.disciplines.push(disc.clone());
        Ok(disc)
    }

    fn list_materials(&self, discipline_id: Option<&str>) -> Vec<Material> {
        self.state
            .read()
            .materials
            .iter()
            .filter(|m| discipline_id.map_or(true, |d| m.discipline_id == d))
            .cloned()
            .collect()
    }

    fn add_material(&self, new: NewMaterial) -> Result<Material, PipelineError> {
        let title = required(&new.title, "title")?;
        let filename = required(&new.filename, "filename")?;
        let mut state = self.state.write();
        let disc = state
            .disciplines
            .iter_mut()
            .find(|d| d.id == new.discipline_id)
            .ok_or_else(|| PipelineError::NotFound(format!("Disciplina não encontrada: {}", new.discipline_id)))?;
        disc.counters.record(new.category, new.subcategory);

        let material = Material {
            id: new_id("mat"),
            title,
            filename,
            material_type: new.material_type,
            size: new.size,
            url: new.url,
            discipline_id: new.discipline_id,
            university_id: new.university_id,
            period_id: new.period_id,
            category: new.category,
            subcategory: new.subcategory,
            created_at: Utc::now(),
        };
        state.materials.push(material.clone());
        tracing::info!(id = %material.id, discipline = %material.discipline_id, "📚 material registered");
        Ok(material)
    }

    fn list_subscribers(&self) -> Vec<Subscriber> {
        self.state.read().subscribers.clone()
    }

    fn add_subscriber(&self, new: NewSubscriber) -> Result<Subscriber, PipelineError> {
        let name = required(&new.name, "name")?;
        let email = required(&new.email, "email")?;
        if !email.contains('@') {
            return Err(PipelineError::Validation(format!("email inválido: {email}")));
        }
        let mut state = self.state.write();
        ensure_parents(&state, &new.university_id, Some(&new.period_id))?;
        let sub = Subscriber {
            id: new_id("sub"),
            name,
            email,
            university_id: new.university_id,
            period_id: new.period_id,
            active: new.active,
        };
        state.subscribers.push(sub.clone());
        Ok(sub)
    }
}
