//! System prompt synthesis from a property profile.
//!
//! Renders a deterministic, section-ordered prompt. The locale selects
//! section labels and connective phrasing only; host-authored data is never
//! translated. Missing fields render an explicit placeholder so the model is
//! never left to guess information it was not given.

use crate::brain::language::Locale;
use crate::models::PropertyProfile;

/// Per-locale labels and connectives for the synthesized prompt.
struct PromptLabels {
    intro: &'static str,
    address: &'static str,
    property_type: &'static str,
    not_specified: &'static str,
    contacts: &'static str,
    host: &'static str,
    maintenance: &'static str,
    emergency: &'static str,
    manager: &'static str,
    schedule: &'static str,
    check_in: &'static str,
    check_out: &'static str,
    late_checkout: &'static str,
    amenities: &'static str,
    rules: &'static str,
    recommendations: &'static str,
    transportation: &'static str,
    appliances: &'static str,
    appliance_instructions: &'static str,
    appliance_troubleshooting: &'static str,
    notes: &'static str,
    faq: &'static str,
    none_listed: &'static str,
    directive: &'static str,
}

const LABELS_EN: PromptLabels = PromptLabels {
    intro: "You are the guest assistant for",
    address: "Address",
    property_type: "Property type",
    not_specified: "not specified",
    contacts: "Contacts",
    host: "Host",
    maintenance: "Maintenance",
    emergency: "Emergency",
    manager: "Property manager",
    schedule: "Schedule",
    check_in: "Check-in",
    check_out: "Check-out",
    late_checkout: "Late checkout",
    amenities: "Amenities",
    rules: "House rules",
    recommendations: "Local recommendations",
    transportation: "Transportation",
    appliances: "Appliance guides",
    appliance_instructions: "Instructions",
    appliance_troubleshooting: "Troubleshooting",
    notes: "House notes",
    faq: "Frequently asked questions",
    none_listed: "none listed",
    directive: "Answer as a warm, concise assistant. Only use the information above; \
if something is not specified, say so honestly and suggest contacting the host. \
For emergencies, always tell the guest to call local emergency services first. \
For broken appliances or maintenance problems, direct the guest to the maintenance contact.",
};

const LABELS_ES: PromptLabels = PromptLabels {
    intro: "Eres el asistente para huéspedes de",
    address: "Dirección",
    property_type: "Tipo de propiedad",
    not_specified: "no especificado",
    contacts: "Contactos",
    host: "Anfitrión",
    maintenance: "Mantenimiento",
    emergency: "Emergencias",
    manager: "Administrador",
    schedule: "Horarios",
    check_in: "Entrada",
    check_out: "Salida",
    late_checkout: "Salida tardía",
    amenities: "Servicios",
    rules: "Normas de la casa",
    recommendations: "Recomendaciones locales",
    transportation: "Transporte",
    appliances: "Guías de electrodomésticos",
    appliance_instructions: "Instrucciones",
    appliance_troubleshooting: "Solución de problemas",
    notes: "Notas de la casa",
    faq: "Preguntas frecuentes",
    none_listed: "nada indicado",
    directive: "Responde como un asistente cálido y conciso. Usa solo la información anterior; \
si algo no está especificado, dilo honestamente y sugiere contactar al anfitrión. \
En emergencias, indica siempre llamar primero a los servicios de emergencia locales. \
Para averías o problemas de mantenimiento, dirige al huésped al contacto de mantenimiento.",
};

const LABELS_FR: PromptLabels = PromptLabels {
    intro: "Tu es l'assistant des voyageurs pour",
    address: "Adresse",
    property_type: "Type de logement",
    not_specified: "non renseigné",
    contacts: "Contacts",
    host: "Hôte",
    maintenance: "Maintenance",
    emergency: "Urgences",
    manager: "Gestionnaire",
    schedule: "Horaires",
    check_in: "Arrivée",
    check_out: "Départ",
    late_checkout: "Départ tardif",
    amenities: "Équipements",
    rules: "Règlement intérieur",
    recommendations: "Recommandations locales",
    transportation: "Transports",
    appliances: "Guides des appareils",
    appliance_instructions: "Instructions",
    appliance_troubleshooting: "Dépannage",
    notes: "Notes de la maison",
    faq: "Questions fréquentes",
    none_listed: "rien d'indiqué",
    directive: "Réponds comme un assistant chaleureux et concis. Utilise uniquement les informations \
ci-dessus ; si quelque chose n'est pas renseigné, dis-le honnêtement et suggère de contacter l'hôte. \
En cas d'urgence, indique toujours d'appeler d'abord les services d'urgence locaux. \
Pour les pannes ou problèmes de maintenance, oriente le voyageur vers le contact maintenance.",
};

const LABELS_DE: PromptLabels = PromptLabels {
    intro: "Du bist der Gäste-Assistent für",
    address: "Adresse",
    property_type: "Unterkunftsart",
    not_specified: "nicht angegeben",
    contacts: "Kontakte",
    host: "Gastgeber",
    maintenance: "Hausmeister",
    emergency: "Notfall",
    manager: "Verwalter",
    schedule: "Zeiten",
    check_in: "Check-in",
    check_out: "Check-out",
    late_checkout: "Später Check-out",
    amenities: "Ausstattung",
    rules: "Hausregeln",
    recommendations: "Empfehlungen in der Nähe",
    transportation: "Verkehrsanbindung",
    appliances: "Geräteanleitungen",
    appliance_instructions: "Anleitung",
    appliance_troubleshooting: "Fehlerbehebung",
    notes: "Hausnotizen",
    faq: "Häufige Fragen",
    none_listed: "nichts hinterlegt",
    directive: "Antworte als freundlicher, knapper Assistent. Nutze ausschließlich die obigen \
Informationen; wenn etwas nicht angegeben ist, sage das ehrlich und verweise auf den Gastgeber. \
Bei Notfällen immer zuerst auf den örtlichen Notruf verweisen. \
Bei defekten Geräten oder Wartungsproblemen an den Hausmeister-Kontakt verweisen.",
};

const LABELS_PT: PromptLabels = PromptLabels {
    intro: "Você é o assistente de hóspedes de",
    address: "Endereço",
    property_type: "Tipo de propriedade",
    not_specified: "não especificado",
    contacts: "Contatos",
    host: "Anfitrião",
    maintenance: "Manutenção",
    emergency: "Emergência",
    manager: "Administrador",
    schedule: "Horários",
    check_in: "Check-in",
    check_out: "Check-out",
    late_checkout: "Saída tardia",
    amenities: "Comodidades",
    rules: "Regras da casa",
    recommendations: "Recomendações locais",
    transportation: "Transporte",
    appliances: "Guias de eletrodomésticos",
    appliance_instructions: "Instruções",
    appliance_troubleshooting: "Solução de problemas",
    notes: "Notas da casa",
    faq: "Perguntas frequentes",
    none_listed: "nada listado",
    directive: "Responda como um assistente caloroso e conciso. Use apenas as informações acima; \
se algo não estiver especificado, diga isso honestamente e sugira contatar o anfitrião. \
Em emergências, oriente sempre a ligar primeiro para os serviços de emergência locais. \
Para aparelhos quebrados ou problemas de manutenção, direcione o hóspede ao contato de manutenção.",
};

fn labels(locale: Locale) -> &'static PromptLabels {
    match locale {
        Locale::English => &LABELS_EN,
        Locale::Spanish => &LABELS_ES,
        Locale::French => &LABELS_FR,
        Locale::German => &LABELS_DE,
        Locale::Portuguese => &LABELS_PT,
    }
}

/// Pure system-prompt synthesizer. Same profile + locale always yields the
/// same prompt.
pub struct PromptSynthesizer;

impl PromptSynthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Builds the system prompt for one conversation turn.
    ///
    /// When `override_directive` is supplied it is used verbatim and nothing
    /// else runs: an escape hatch for upstream administrative tooling, not a
    /// merge.
    pub fn synthesize(
        &self,
        profile: &PropertyProfile,
        locale: Locale,
        override_directive: Option<&str>,
    ) -> String {
        if let Some(directive) = override_directive {
            return directive.to_string();
        }

        let l = labels(locale);
        let mut sections = Vec::new();

        sections.push(self.identity_section(profile, l));
        sections.push(self.contacts_section(profile, l));
        sections.push(self.schedule_section(profile, l));
        sections.push(self.grouped_section(l.amenities, &profile.amenities, l));
        sections.push(self.grouped_section(l.rules, &profile.rules, l));
        sections.push(self.recommendations_section(profile, l));
        sections.push(format!(
            "{}: {}",
            l.transportation,
            text_or(profile.transportation.as_deref(), l.not_specified)
        ));
        if !profile.appliances.is_empty() {
            sections.push(self.appliances_section(profile, l));
        }
        if !profile.instructions.is_empty() {
            sections.push(self.notes_section(profile, l));
        }
        if !profile.faqs.is_empty() {
            sections.push(self.faq_section(profile, l));
        }
        sections.push(l.directive.to_string());

        sections.join("\n\n")
    }

    fn identity_section(&self, profile: &PropertyProfile, l: &PromptLabels) -> String {
        format!(
            "{} \"{}\".\n{}: {}\n{}: {}",
            l.intro,
            profile.name,
            l.address,
            text_or(profile.address.as_deref(), l.not_specified),
            l.property_type,
            text_or(profile.property_type.as_deref(), l.not_specified),
        )
    }

    fn contacts_section(&self, profile: &PropertyProfile, l: &PromptLabels) -> String {
        let c = &profile.contacts;
        format!(
            "{}:\n- {}: {}\n- {}: {}\n- {}: {}\n- {}: {}",
            l.contacts,
            l.host,
            text_or(c.host.as_deref(), l.not_specified),
            l.maintenance,
            text_or(c.maintenance.as_deref(), l.not_specified),
            l.emergency,
            text_or(c.emergency.as_deref(), l.not_specified),
            l.manager,
            text_or(c.manager.as_deref(), l.not_specified),
        )
    }

    fn schedule_section(&self, profile: &PropertyProfile, l: &PromptLabels) -> String {
        let s = &profile.schedule;
        format!(
            "{}:\n- {}: {}\n- {}: {}\n- {}: {}",
            l.schedule,
            l.check_in,
            text_or(s.check_in.as_deref(), l.not_specified),
            l.check_out,
            text_or(s.check_out.as_deref(), l.not_specified),
            l.late_checkout,
            text_or(s.late_checkout.as_deref(), l.not_specified),
        )
    }

    fn grouped_section(
        &self,
        heading: &str,
        groups: &std::collections::BTreeMap<String, Vec<String>>,
        l: &PromptLabels,
    ) -> String {
        if groups.is_empty() {
            return format!("{}: {}", heading, l.none_listed);
        }
        let mut lines = vec![format!("{}:", heading)];
        for (category, items) in groups {
            if items.is_empty() {
                lines.push(format!("- {}: {}", category, l.none_listed));
            } else {
                lines.push(format!("- {}: {}", category, items.join(", ")));
            }
        }
        lines.join("\n")
    }

    fn recommendations_section(&self, profile: &PropertyProfile, l: &PromptLabels) -> String {
        if profile.recommendations.is_empty() {
            return format!("{}: {}", l.recommendations, l.none_listed);
        }
        let mut lines = vec![format!("{}:", l.recommendations)];
        for rec in &profile.recommendations {
            let mut line = format!("- {}", rec.name);
            if let Some(category) = &rec.category {
                line.push_str(&format!(" ({})", category));
            }
            if let Some(description) = &rec.description {
                line.push_str(&format!(": {}", description));
            }
            if let Some(notes) = &rec.notes {
                line.push_str(&format!(". {}", notes));
            }
            lines.push(line);
        }
        lines.join("\n")
    }

    fn appliances_section(&self, profile: &PropertyProfile, l: &PromptLabels) -> String {
        let mut lines = vec![format!("{}:", l.appliances)];
        for guide in &profile.appliances {
            let mut line = format!("- {}", guide.name);
            if let Some(kind) = &guide.kind {
                line.push_str(&format!(" ({})", kind));
            }
            line.push_str(&format!(
                ". {}: {}",
                l.appliance_instructions,
                text_or(guide.instructions.as_deref(), l.not_specified)
            ));
            if let Some(troubleshooting) = &guide.troubleshooting {
                line.push_str(&format!(
                    " {}: {}",
                    l.appliance_troubleshooting, troubleshooting
                ));
            }
            lines.push(line);
        }
        lines.join("\n")
    }

    fn notes_section(&self, profile: &PropertyProfile, l: &PromptLabels) -> String {
        let mut lines = vec![format!("{}:", l.notes)];
        for note in &profile.instructions {
            lines.push(format!("- {}: {}", note.title, note.content));
        }
        lines.join("\n")
    }

    fn faq_section(&self, profile: &PropertyProfile, l: &PromptLabels) -> String {
        let mut lines = vec![format!("{}:", l.faq)];
        for faq in &profile.faqs {
            lines.push(format!("- {} {}", faq.question, faq.answer));
        }
        lines.join("\n")
    }
}

impl Default for PromptSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

fn text_or<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HouseNote, PropertyProfile, Recommendation};

    fn sample_profile() -> PropertyProfile {
        let mut profile = PropertyProfile::default_profile();
        profile.name = "Casa Azul".to_string();
        profile.address = Some("12 Calle del Mar, Valencia".to_string());
        profile.contacts.host = Some("+34 600 000 001".to_string());
        profile.schedule.check_in = Some("15:00".to_string());
        profile.amenities.insert(
            "Wifi".to_string(),
            vec!["Network: CasaAzul".to_string(), "Password: limon2024".to_string()],
        );
        profile.rules.insert(
            "Noise".to_string(),
            vec!["Quiet hours after 22:00".to_string()],
        );
        profile.recommendations.push(Recommendation {
            name: "La Pepica".to_string(),
            category: Some("restaurant".to_string()),
            description: Some("Paella on the beach".to_string()),
            notes: None,
        });
        profile.instructions.push(HouseNote {
            title: "Trash".to_string(),
            content: "Bins go out Tuesday night".to_string(),
        });
        profile
    }

    #[test]
    fn test_override_is_verbatim_and_exclusive() {
        let synthesizer = PromptSynthesizer::new();
        let prompt = synthesizer.synthesize(
            &sample_profile(),
            Locale::English,
            Some("You are a pirate."),
        );
        assert_eq!(prompt, "You are a pirate.");
    }

    #[test]
    fn test_sections_render_in_order() {
        let synthesizer = PromptSynthesizer::new();
        let prompt = synthesizer.synthesize(&sample_profile(), Locale::English, None);

        let contacts_pos = prompt.find("Contacts:").unwrap();
        let schedule_pos = prompt.find("Schedule:").unwrap();
        let amenities_pos = prompt.find("Amenities:").unwrap();
        let rules_pos = prompt.find("House rules:").unwrap();
        assert!(contacts_pos < schedule_pos);
        assert!(schedule_pos < amenities_pos);
        assert!(amenities_pos < rules_pos);
        assert!(prompt.contains("Casa Azul"));
        assert!(prompt.contains("Password: limon2024"));
        assert!(prompt.contains("La Pepica"));
        assert!(prompt.contains("Bins go out Tuesday night"));
    }

    #[test]
    fn test_missing_fields_render_placeholder_not_blank() {
        let synthesizer = PromptSynthesizer::new();
        let prompt = synthesizer.synthesize(
            &PropertyProfile::default_profile(),
            Locale::English,
            None,
        );
        assert!(prompt.contains("not specified"));
        assert!(prompt.contains("Maintenance: not specified"));
        assert!(prompt.contains("Transportation: not specified"));
    }

    #[test]
    fn test_no_template_placeholders_leak() {
        let synthesizer = PromptSynthesizer::new();
        for locale in Locale::all() {
            let prompt = synthesizer.synthesize(&sample_profile(), *locale, None);
            assert!(!prompt.contains("{}"), "leak in {:?}", locale);
            assert!(!prompt.contains("{{"), "leak in {:?}", locale);
            assert!(!prompt.is_empty());
        }
    }

    #[test]
    fn test_locale_changes_labels_not_data() {
        let synthesizer = PromptSynthesizer::new();
        let profile = sample_profile();
        let spanish = synthesizer.synthesize(&profile, Locale::Spanish, None);
        assert!(spanish.contains("Contactos:"));
        // Host data stays in whatever language the host wrote it.
        assert!(spanish.contains("Quiet hours after 22:00"));
        assert!(spanish.contains("Password: limon2024"));
    }

    #[test]
    fn test_directive_always_present() {
        let synthesizer = PromptSynthesizer::new();
        let prompt = synthesizer.synthesize(&sample_profile(), Locale::English, None);
        assert!(prompt.contains("local emergency services"));
        let prompt_fr =
            synthesizer.synthesize(&PropertyProfile::default_profile(), Locale::French, None);
        assert!(prompt_fr.contains("services d'urgence"));
    }
}
