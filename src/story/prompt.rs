//! Prompt construction for the initial chapter and for continuations.
//! Pure string building; no I/O.

use crate::culture::{self, CultureProfile};
use crate::models::StoryRequest;
use crate::story::parser::DecisionOption;
use crate::story::session::{Chapter, MAX_DECISIONS};

const CHAPTER_SEPARATOR: &str = "\n\n--- CAPÍTULO ANTERIOR ---\n\n";

const CONTINUATION_WORD_CAP: u32 = 300;

const DECISION_FORMAT: &str = "[DECISIÓN: ¿Pregunta clara para el lector?]
A) Primera opción
B) Segunda opción";

pub fn build_initial_prompt(request: &StoryRequest) -> String {
    let profile = culture::profile(request.culture);
    let story_kind = culture::story_type_description(request.story_type);
    let (min_words, max_words) = request.duration.word_range();

    let mut prompt = format!(
        "Eres un narrador experto en culturas prehispánicas mexicanas. \
         Crea una historia ({story_kind}) de la cultura {name} con estas especificaciones:\n\n",
        name = profile.name,
    );

    prompt.push_str(&cultural_context(profile));

    prompt.push_str(&format!(
        "\nPARÁMETROS DE LA HISTORIA:\n\
         - Personajes principales: {characters}\n\
         - Lugar principal: {setting}\n\
         - Tema central: {theme}\n\
         - Edad del público: {age} años\n\
         - Duración aproximada: {minutes} minutos de lectura\n",
        characters = request.characters.trim(),
        setting = request.setting.trim(),
        theme = request.theme.trim(),
        age = request.audience_age.as_str(),
        minutes = request.duration.reading_minutes(),
    ));

    prompt.push_str(&format!(
        "\nINSTRUCCIONES CULTURALES CRÍTICAS:\n\
         1. RESPETAR la autenticidad histórica y cultural\n\
         2. USAR elementos, nombres y conceptos genuinos de la cultura {name}\n\
         3. EVITAR anacronismos o elementos de otras culturas\n\
         4. INCORPORAR valores y cosmovisión de la civilización elegida\n\
         5. USAR un lenguaje respetuoso y educativo sobre la cultura ancestral\n",
        name = profile.name,
    ));

    if request.branching_enabled {
        prompt.push_str(&format!(
            "\nFORMATO INTERACTIVO:\n\
             - Detén la narración en un momento decisivo\n\
             - Incluye EXACTAMENTE UNA decisión con EXACTAMENTE 2 opciones (A y B)\n\
             - NO resuelvas la decisión ni supongas cuál se elige\n\
             - Formato obligatorio, al final del texto:\n{DECISION_FORMAT}\n"
        ));
    }

    prompt.push_str(&format!(
        "\nESTRUCTURA REQUERIDA:\n\
         1. Título inspirado en la cultura {name}\n\
         2. Inicio que establezca el contexto cultural\n\
         3. Desarrollo con elementos auténticos de la civilización\n\
         4. {climax}\n\
         \nLONGITUD: Aproximadamente {min_words}-{max_words} palabras.\n\
         \nCrea una historia memorable que honre la riqueza cultural de {name} y eduque sobre su legado.\n",
        name = profile.name,
        climax = if request.branching_enabled {
            "Un momento de decisión para el lector"
        } else {
            "Clímax con resolución satisfactoria y un final que refuerce valores culturales"
        },
    ));

    prompt
}

/// `decision_count` is the number of decisions taken before `chosen`.
pub fn build_continuation_prompt(
    chapters: &[Chapter],
    chosen: &DecisionOption,
    decision_count: u8,
) -> String {
    let history = chapters
        .iter()
        .map(|chapter| chapter.raw_text.as_str())
        .collect::<Vec<_>>()
        .join(CHAPTER_SEPARATOR);
    let is_last_decision = decision_count.saturating_add(1) >= MAX_DECISIONS;

    let mut prompt = format!(
        "Continúa esta historia cultural basándote en la decisión elegida:\n\n\
         HISTORIA HASTA AHORA:\n{history}\n\n\
         DECISIÓN ELEGIDA: {chosen}\n\n\
         INSTRUCCIONES IMPORTANTES:\n\
         - Continúa la narrativa desde la decisión elegida\n\
         - Mantén el mismo estilo y tono cultural\n\
         - Desarrolla las consecuencias de la elección en máximo {CONTINUATION_WORD_CAP} palabras\n"
    );

    if is_last_decision {
        prompt.push_str(
            "- ESTA ES LA DECISIÓN FINAL: Concluye la historia de manera satisfactoria SIN incluir más decisiones\n",
        );
    } else {
        prompt.push_str("- Incluye SOLO UNA nueva decisión con EXACTAMENTE 2 opciones (A y B)\n");
    }

    prompt.push_str(
        "- NO incluyas texto como \"(Supongamos que se elige)\"\n\
         - NO resuelvas las decisiones automáticamente\n",
    );

    if !is_last_decision {
        prompt.push_str(&format!("- Formato de decisiones:\n{DECISION_FORMAT}\n"));
    }

    prompt.push_str("\nContinúa la historia:");
    prompt
}

fn cultural_context(profile: &CultureProfile) -> String {
    format!(
        "CONTEXTO CULTURAL ESPECÍFICO:\n\
         - Civilización: {}\n\
         - Descripción: {}\n\
         - Elementos culturales auténticos: {}\n\
         - Lugares característicos: {}\n\
         - Personajes tradicionales: {}\n",
        profile.name,
        profile.description,
        profile.elements.join(", "),
        profile.places.join(", "),
        profile.characters.join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AudienceAge, Culture, ReadingLength, StoryType};

    fn request(branching_enabled: bool) -> StoryRequest {
        StoryRequest {
            culture: Culture::Maya,
            story_type: StoryType::Adventure,
            characters: "Itzamná y un joven escriba llamado Akbal".into(),
            setting: "Las selvas del Petén".into(),
            theme: "La búsqueda del conocimiento perdido".into(),
            audience_age: AudienceAge::Teen,
            duration: ReadingLength::Long,
            branching_enabled,
        }
    }

    fn chapters(texts: &[&str]) -> Vec<Chapter> {
        texts
            .iter()
            .enumerate()
            .map(|(index, text)| Chapter::new(index, *text))
            .collect()
    }

    #[test]
    fn initial_prompt_embeds_culture_and_request() {
        let prompt = build_initial_prompt(&request(false));
        assert!(prompt.contains("Chichén Itzá, Palenque, Tikal, Uxmal"));
        assert!(prompt.contains("cenotes, observatorios"));
        assert!(prompt.contains("Itzamná, Kukulkán"));
        assert!(prompt.contains("Akbal"));
        assert!(prompt.contains("13-17 años"));
        assert!(prompt.contains("EVITAR anacronismos"));
        assert!(prompt.contains("800-1000 palabras"));
    }

    #[test]
    fn decision_format_only_when_branching() {
        assert!(!build_initial_prompt(&request(false)).contains("FORMATO INTERACTIVO"));
        let branching = build_initial_prompt(&request(true));
        assert!(branching.contains("FORMATO INTERACTIVO"));
        assert!(branching.contains("EXACTAMENTE 2 opciones"));
        assert!(branching.contains("[DECISIÓN:"));
    }

    #[test]
    fn word_ranges_follow_duration() {
        let mut req = request(false);
        req.duration = ReadingLength::Short;
        assert!(build_initial_prompt(&req).contains("300-400 palabras"));
        req.duration = ReadingLength::Medium;
        assert!(build_initial_prompt(&req).contains("500-700 palabras"));
    }

    #[test]
    fn continuation_carries_raw_history_and_choice() {
        let history = chapters(&[
            "Capítulo uno.\n¿Qué decide Akbal?\nA) Entrar\nB) Esperar",
            "Capítulo dos.",
        ]);
        let chosen = DecisionOption::new('B', "Esperar al amanecer");
        let prompt = build_continuation_prompt(&history, &chosen, 1);

        assert!(prompt.contains("¿Qué decide Akbal?\nA) Entrar"));
        assert!(prompt.contains("Capítulo uno.") && prompt.contains("Capítulo dos."));
        assert!(prompt.contains("--- CAPÍTULO ANTERIOR ---"));
        assert!(prompt.contains("DECISIÓN ELEGIDA: B) Esperar al amanecer"));
        assert!(prompt.contains("SOLO UNA nueva decisión"));
        assert!(!prompt.contains("DECISIÓN FINAL"));
    }

    #[test]
    fn third_decision_asks_for_an_ending() {
        let history = chapters(&["uno", "dos", "tres"]);
        let prompt = build_continuation_prompt(&history, &DecisionOption::new('A', "Luchar"), 2);
        assert!(prompt.contains("DECISIÓN FINAL"));
        assert!(!prompt.contains("SOLO UNA nueva decisión"));
        assert!(!prompt.contains("Formato de decisiones"));
    }

    #[test]
    fn prompts_are_deterministic() {
        let req = request(true);
        assert_eq!(build_initial_prompt(&req), build_initial_prompt(&req));
    }
}
