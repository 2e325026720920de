// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Deterministic demo rosters for offline (`--demo`) runs and tests.
//! Names carry accents on purpose so sorting exercises collation.

use escola_app::{
    Aluno, AlunoId, ChartKind, ChartSpec, DashboardStats, Disciplina, DisciplinaId, Professor,
    ProfessorId, Turma, TurmaId,
};

const ALUNO_NOMES: [&str; 10] = [
    "Álvaro Dias",
    "Beatriz Araújo",
    "carlos lima",
    "Cecília Gonçalves",
    "Érica Souza",
    "Estêvão Martins",
    "João Pedro Assunção",
    "Luana Conceição",
    "Maria Clara Ferreira",
    "Ângela Moraes",
];

const PROFESSOR_NOMES: [&str; 5] = [
    "André Albuquerque",
    "Conceição Tavares",
    "Inês Barbosa",
    "José Ribamar Costa",
    "Sérgio Nascimento",
];

const TURMA_NOMES: [&str; 4] = ["1º Ano A", "1º Ano B", "2º Ano A", "3º Ano A"];
const TURNOS: [&str; 4] = ["manhã", "manhã", "tarde", "noite"];

const DISCIPLINAS: [(&str, &str, i32); 5] = [
    ("Português", "POR", 120),
    ("Matemática", "MAT", 120),
    ("História", "HIS", 80),
    ("Geografia", "GEO", 80),
    ("Ciências", "CIE", 100),
];

pub fn demo_alunos() -> Vec<Aluno> {
    ALUNO_NOMES
        .iter()
        .enumerate()
        .map(|(index, nome)| Aluno {
            id: AlunoId::new(index as i64 + 1),
            nome: (*nome).to_owned(),
            matricula: format!("2026{:03}", index + 1),
            turma: TURMA_NOMES[index % TURMA_NOMES.len()].to_owned(),
            nome_responsavel: String::new(),
            status: if index % 7 == 6 { "inativo" } else { "ativo" }.to_owned(),
        })
        .collect()
}

pub fn demo_professores() -> Vec<Professor> {
    PROFESSOR_NOMES
        .iter()
        .enumerate()
        .map(|(index, nome)| Professor {
            id: ProfessorId::new(index as i64 + 1),
            nome: (*nome).to_owned(),
            matricula: format!("P{:03}", index + 1),
            email: format!("prof{}@escola.example", index + 1),
            formacao: "Licenciatura".to_owned(),
            status: "ativo".to_owned(),
        })
        .collect()
}

pub fn demo_turmas() -> Vec<Turma> {
    TURMA_NOMES
        .iter()
        .enumerate()
        .map(|(index, nome)| Turma {
            id: TurmaId::new(index as i64 + 1),
            nome: (*nome).to_owned(),
            ano: 2026,
            turno: TURNOS[index].to_owned(),
            ativa: true,
        })
        .collect()
}

pub fn demo_disciplinas() -> Vec<Disciplina> {
    DISCIPLINAS
        .iter()
        .enumerate()
        .map(|(index, (nome, codigo, carga))| Disciplina {
            id: DisciplinaId::new(index as i64 + 1),
            nome: (*nome).to_owned(),
            codigo: (*codigo).to_owned(),
            carga_horaria: *carga,
            ativa: true,
        })
        .collect()
}

pub fn demo_stats() -> DashboardStats {
    DashboardStats {
        students: demo_alunos().len() as i64,
        teachers: demo_professores().len() as i64,
        classes: demo_turmas().len() as i64,
        subjects: demo_disciplinas().len() as i64,
    }
}

pub fn demo_chart() -> ChartSpec {
    let stats = demo_stats();
    ChartSpec {
        kind: ChartKind::Bar,
        labels: vec![
            "alunos".to_owned(),
            "professores".to_owned(),
            "turmas".to_owned(),
            "disciplinas".to_owned(),
        ],
        values: vec![
            stats.students as f64,
            stats.teachers as f64,
            stats.classes as f64,
            stats.subjects as f64,
        ],
    }
}
