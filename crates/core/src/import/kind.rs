//! Closed set of importable entity kinds.

use serde::Serialize;

use super::checks::FieldCheck;
use crate::store::Collection;

pub const SELECTOR_STUDENTS: &str = "alumnos";
pub const SELECTOR_PROFESSORS: &str = "docentes";
pub const SELECTOR_PROGRAMS: &str = "carreras";
pub const SELECTOR_DEPARTMENTS: &str = "departamentos";
pub const SELECTOR_SUBJECTS: &str = "materias";
pub const SELECTOR_CLASSROOMS: &str = "aulas";

/// Path selectors accepted by `POST /api/v1/import/{entidad}`.
pub const SELECTORS: &[&str] = &[
    SELECTOR_STUDENTS,
    SELECTOR_PROFESSORS,
    SELECTOR_PROGRAMS,
    SELECTOR_DEPARTMENTS,
    SELECTOR_SUBJECTS,
    SELECTOR_CLASSROOMS,
];

/// Campuses a classroom may belong to.
pub const CAMPUSES: &[&str] = &["CU", "LH", "PC"];

/// Highest enrolment priority a student can hold.
pub const MAX_PRIORITY: i64 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ImportKind {
    Student,
    Professor,
    Program,
    Department,
    Subject,
    Classroom,
    /// Subject list of one degree program, selected by its code.
    Curriculum { program_code: i64 },
}

impl ImportKind {
    /// Resolve an entity selector. `Curriculum` has no selector of its own.
    pub fn from_selector(selector: &str) -> Option<Self> {
        match selector {
            SELECTOR_STUDENTS => Some(Self::Student),
            SELECTOR_PROFESSORS => Some(Self::Professor),
            SELECTOR_PROGRAMS => Some(Self::Program),
            SELECTOR_DEPARTMENTS => Some(Self::Department),
            SELECTOR_SUBJECTS => Some(Self::Subject),
            SELECTOR_CLASSROOMS => Some(Self::Classroom),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => SELECTOR_STUDENTS,
            Self::Professor => SELECTOR_PROFESSORS,
            Self::Program => SELECTOR_PROGRAMS,
            Self::Department => SELECTOR_DEPARTMENTS,
            Self::Subject => SELECTOR_SUBJECTS,
            Self::Classroom => SELECTOR_CLASSROOMS,
            Self::Curriculum { .. } => "plan_de_estudios",
        }
    }

    /// Fixed column order expected in the CSV file.
    pub fn headers(&self) -> &'static [&'static str] {
        match self {
            Self::Student => &["Padrón", "DNI", "Nombres", "Apellidos", "Carreras", "Prioridad"],
            Self::Professor => &["DNI", "Nombres", "Apellidos"],
            Self::Program | Self::Department => &["Identificador", "Nombre"],
            Self::Subject => &["Departamento", "Identificador", "Nombre", "Créditos"],
            Self::Classroom => &["Sede", "Aula", "Capacidad"],
            Self::Curriculum { .. } => &["Código", "Nombre"],
        }
    }

    /// Collection written by the commit stage.
    pub fn collection(&self) -> Collection {
        match self {
            Self::Student => Collection::Students,
            Self::Professor => Collection::Professors,
            Self::Program | Self::Curriculum { .. } => Collection::Programs,
            Self::Department => Collection::Departments,
            Self::Subject => Collection::Subjects,
            Self::Classroom => Collection::Classrooms,
        }
    }

    /// Document fields that identify an entity across imports.
    pub fn natural_key(&self) -> &'static [&'static str] {
        match self {
            Self::Student | Self::Professor => &["dni"],
            Self::Program | Self::Department | Self::Curriculum { .. } => &["codigo"],
            Self::Subject => &["codigoDepartamento", "codigo"],
            Self::Classroom => &["sede", "aula"],
        }
    }

    /// Document field of the national id that seeds account passwords, for
    /// kinds that create login accounts.
    pub fn account_key(&self) -> Option<&'static str> {
        self.checks().iter().find_map(|check| match check {
            FieldCheck::NationalId { field, .. } => Some(*field),
            _ => None,
        })
    }

    /// Ordered row checks. A row is valid when every check passes.
    pub fn checks(&self) -> &'static [FieldCheck] {
        use FieldCheck::*;

        match self {
            Self::Student => &[
                PositiveInteger { column: "Padrón", field: "padron" },
                NationalId { column: "DNI", field: "dni" },
                PersonName { column: "Nombres", field: "nombres" },
                PersonName { column: "Apellidos", field: "apellidos" },
                ProgramCodes { column: "Carreras", field: "carreras" },
                IntegerInRange { column: "Prioridad", field: "prioridad", min: 1, max: MAX_PRIORITY },
            ],
            Self::Professor => &[
                NationalId { column: "DNI", field: "dni" },
                PersonName { column: "Nombres", field: "nombres" },
                PersonName { column: "Apellidos", field: "apellidos" },
            ],
            Self::Program => &[
                PositiveInteger { column: "Identificador", field: "codigo" },
                PersonName { column: "Nombre", field: "nombre" },
                ProgramExists { field: "codigo" },
            ],
            Self::Department => &[
                PositiveInteger { column: "Identificador", field: "codigo" },
                PersonName { column: "Nombre", field: "nombre" },
            ],
            Self::Subject => &[
                PositiveInteger { column: "Departamento", field: "codigoDepartamento" },
                PositiveInteger { column: "Identificador", field: "codigo" },
                PersonName { column: "Nombre", field: "nombre" },
                PositiveInteger { column: "Créditos", field: "creditos" },
                DepartmentRef { code_field: "codigoDepartamento", field: "departamento" },
            ],
            Self::Classroom => &[
                OneOf { column: "Sede", field: "sede", options: CAMPUSES },
                NonEmpty { column: "Aula", field: "aula" },
                PositiveInteger { column: "Capacidad", field: "capacidad" },
            ],
            Self::Curriculum { .. } => &[
                SubjectCode { column: "Código", field: "materia" },
                PersonName { column: "Nombre", field: "nombre" },
            ],
        }
    }
}

impl std::fmt::Display for ImportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Curriculum { program_code } => write!(f, "{}:{program_code}", self.as_str()),
            _ => f.write_str(self.as_str()),
        }
    }
}
